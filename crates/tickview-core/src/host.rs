//! Render boundary between an animator and the view system hosting it.

/// Fire-and-forget requests an animator makes of its host view.
pub trait Host {
    /// Appearance changed; repaint when convenient.
    fn request_redraw(&mut self);

    /// Content size may have changed; run a layout pass before the next paint.
    fn request_remeasure(&mut self);
}

/// Host that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn request_redraw(&mut self) {}

    fn request_remeasure(&mut self) {}
}

/// Host that counts requests, for tests and headless runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingHost {
    /// Redraw requests received
    pub redraws: usize,
    /// Remeasure requests received
    pub remeasures: usize,
}

impl RecordingHost {
    /// Create a host with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for RecordingHost {
    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn request_remeasure(&mut self) {
        self.remeasures += 1;
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn request_redraw(&mut self) {
        (**self).request_redraw();
    }

    fn request_remeasure(&mut self) {
        (**self).request_remeasure();
    }
}
