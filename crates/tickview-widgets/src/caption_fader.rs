//! Caption cross-fade animator.
//!
//! Two text slots alternate between an outgoing role (the caption on
//! screen) and an incoming role (the caption about to replace it). A cycle
//! is:
//!
//! 1. **Hold**: outgoing at alpha 255, incoming at 0, nothing scheduled but
//!    the next fade after `hold_duration_ms`.
//! 2. **Fade out**: outgoing alpha drops by the fade step every `tick_ms`.
//! 3. **Fade in**: incoming alpha rises by the fade step every `tick_ms`.
//! 4. **Swap**: roles swap, the next caption is chosen into the new incoming
//!    slot, a remeasure is requested and the next hold begins.
//!
//! Only one slot is ever between the endpoints. [`FadeStyle::Instant`] skips
//! the ramps and swaps on the tick that ends the hold.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tickview_core::config::{self, require_positive};
use tickview_core::{
    Animated, Canvas, Color, ColorSpec, ConfigError, Host, ManualScheduler, MeasureSpec, NullHost,
    Point, Rect, Scheduler, Size, TextMetrics, TextStyle, TickKind,
};
use tracing::{debug, trace, warn};

/// Random attempts before shuffle falls back to sequential selection.
const SHUFFLE_ATTEMPTS: usize = 100;

/// How a transition between captions is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FadeStyle {
    /// Fade the outgoing caption out, then the incoming one in.
    #[default]
    Graduated,
    /// Swap captions in a single tick.
    Instant,
}

/// Where the animator is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Outgoing caption fully shown
    Hold,
    /// Outgoing caption ramping to transparent
    FadeOut,
    /// Incoming caption ramping to opaque
    FadeIn,
}

/// One text slot: which caption it shows and how opaque it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionSlot {
    /// Index into the caption list
    pub index: usize,
    /// Opacity, 0 to 255
    pub alpha: u8,
}

/// Construction options for [`CaptionFader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptionConfig {
    /// Captions to cycle through
    pub captions: Vec<String>,
    /// Time between fade ticks
    pub tick_ms: u64,
    /// Time for one ramp between endpoints
    pub fade_duration_ms: u64,
    /// Time a caption stays fully shown
    pub hold_duration_ms: u64,
    /// Pick captions at random instead of in order
    pub shuffle: bool,
    /// Start fading as soon as the animator is built
    pub auto_start: bool,
    /// Text color
    pub color: ColorSpec,
    /// Font size in pixels
    pub text_size: f32,
    /// Ramp or instant swap
    pub fade_style: FadeStyle,
    /// Seed for shuffle selection; random when absent
    pub seed: Option<u64>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            captions: Vec::new(),
            tick_ms: 40,
            fade_duration_ms: 2000,
            hold_duration_ms: 5000,
            shuffle: true,
            auto_start: true,
            color: ColorSpec::Packed(0xFF00_0000),
            text_size: 50.0,
            fade_style: FadeStyle::Graduated,
            seed: None,
        }
    }
}

impl CaptionConfig {
    /// Parse from YAML and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let parsed: Self = config::from_yaml_str(yaml)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values the fade arithmetic cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tickMs", self.tick_ms)?;
        require_positive("fadeDurationMs", self.fade_duration_ms)?;
        if !(self.text_size.is_finite() && self.text_size > 0.0) {
            return Err(ConfigError::invalid("textSize", "must be a positive number"));
        }
        self.color.resolve().map(|_| ())
    }
}

/// Caption cross-fade animator.
pub struct CaptionFader<S: Scheduler = ManualScheduler, H: Host = NullHost> {
    captions: Vec<String>,
    slots: [CaptionSlot; 2],
    outgoing: usize,
    previous: Option<usize>,
    phase: FadePhase,
    fade_style: FadeStyle,
    shuffle: bool,
    tick_ms: u64,
    fade_duration_ms: u64,
    hold_duration_ms: u64,
    text_size: f32,
    color: Color,
    running: bool,
    rng: StdRng,
    scheduler: S,
    host: H,
}

impl<S: Scheduler, H: Host> CaptionFader<S, H> {
    /// Create an idle fader with default options and a random seed.
    pub fn new(captions: Vec<String>, scheduler: S, host: H) -> Self {
        Self::build(captions, StdRng::from_os_rng(), scheduler, host)
    }

    /// Build from a validated config, starting immediately when
    /// `auto_start` is set.
    pub fn from_config(config: &CaptionConfig, scheduler: S, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let mut fader = Self::build(config.captions.clone(), rng, scheduler, host);
        fader.tick_ms = config.tick_ms;
        fader.fade_duration_ms = config.fade_duration_ms;
        fader.hold_duration_ms = config.hold_duration_ms;
        fader.fade_style = config.fade_style;
        fader.set_shuffle(config.shuffle);
        fader.text_size = config.text_size;
        fader.color = config.color.resolve()?;
        if fader.raw_fade_step() == 0 {
            warn!(
                tick_ms = fader.tick_ms,
                fade_duration_ms = fader.fade_duration_ms,
                "fade step rounds to zero, using 1"
            );
        }
        if config.auto_start {
            fader.start(true);
        }
        Ok(fader)
    }

    fn build(captions: Vec<String>, rng: StdRng, scheduler: S, host: H) -> Self {
        let mut fader = Self {
            captions: normalize_captions(captions),
            slots: [
                CaptionSlot {
                    index: 0,
                    alpha: 255,
                },
                CaptionSlot { index: 1, alpha: 0 },
            ],
            outgoing: 0,
            previous: None,
            phase: FadePhase::Hold,
            fade_style: FadeStyle::Graduated,
            shuffle: false,
            tick_ms: 40,
            fade_duration_ms: 2000,
            hold_duration_ms: 5000,
            text_size: 50.0,
            color: Color::BLACK,
            running: false,
            rng,
            scheduler,
            host,
        };
        fader.set_shuffle(true);
        fader
    }

    // -------------------------------------------------------------------------
    // Animation control
    // -------------------------------------------------------------------------

    /// Begin cycling, with the first fade now or after one hold. Ignored
    /// while already running.
    pub fn start(&mut self, immediate: bool) {
        if self.running {
            return;
        }
        self.scheduler.cancel_all();
        let delay = if immediate { 0 } else { self.hold_duration_ms };
        self.scheduler.schedule(delay, TickKind::Advance);
        self.running = true;
        debug!(immediate, phase = ?self.phase, "caption fader started");
    }

    /// Cancel pending work, keeping slot state so [`start`](Self::start)
    /// picks up where it left off.
    pub fn pause(&mut self) {
        self.scheduler.cancel_all();
        self.running = false;
        debug!(phase = ?self.phase, "caption fader paused");
    }

    fn advance(&mut self) {
        if !self.running {
            trace!("stale fade tick ignored");
            return;
        }
        // style is only consulted when a transition begins
        match self.phase {
            FadePhase::Hold if self.fade_style == FadeStyle::Instant => self.finish_transition(),
            FadePhase::Hold | FadePhase::FadeOut => {
                self.phase = FadePhase::FadeOut;
                let step = self.fade_step();
                let out = &mut self.slots[self.outgoing];
                out.alpha = out.alpha.saturating_sub(step);
                if out.alpha == 0 {
                    self.phase = FadePhase::FadeIn;
                }
                self.scheduler.schedule(self.tick_ms, TickKind::Advance);
            }
            FadePhase::FadeIn => {
                let step = self.fade_step();
                let incoming = &mut self.slots[1 - self.outgoing];
                incoming.alpha = incoming.alpha.saturating_add(step);
                if incoming.alpha == u8::MAX {
                    self.finish_transition();
                } else {
                    self.scheduler.schedule(self.tick_ms, TickKind::Advance);
                }
            }
        }
        trace!(a = self.slots[0].alpha, b = self.slots[1].alpha, phase = ?self.phase, "fade tick");
        self.host.request_redraw();
    }

    /// Swap roles, choose the next caption and start the next hold.
    fn finish_transition(&mut self) {
        self.previous = Some(self.slots[self.outgoing].index);
        self.outgoing = 1 - self.outgoing;
        self.slots[self.outgoing].alpha = u8::MAX;
        let next = self.choose_next();
        self.slots[1 - self.outgoing] = CaptionSlot {
            index: next,
            alpha: 0,
        };
        self.phase = FadePhase::Hold;
        debug!(shown = self.current_index(), next, "caption swapped");
        // captions differ in width
        self.host.request_remeasure();
        self.scheduler
            .schedule(self.hold_duration_ms, TickKind::Advance);
    }

    fn choose_next(&mut self) -> usize {
        let len = self.captions.len();
        let current = self.current_index();
        if len == 2 {
            return 1 - current;
        }
        if !self.shuffle {
            return sequential_excluding(len, current, self.previous);
        }
        for _ in 0..SHUFFLE_ATTEMPTS {
            let candidate = self.rng.random_range(0..len);
            if candidate != current && Some(candidate) != self.previous {
                return candidate;
            }
        }
        sequential_excluding(len, current, self.previous)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Normalized caption list, always at least two entries.
    #[must_use]
    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    /// First text slot.
    #[must_use]
    pub const fn slot_a(&self) -> CaptionSlot {
        self.slots[0]
    }

    /// Second text slot.
    #[must_use]
    pub const fn slot_b(&self) -> CaptionSlot {
        self.slots[1]
    }

    /// Index of the caption in the outgoing role, the one shown during hold.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.slots[self.outgoing].index
    }

    /// Index of the caption queued to fade in next.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.slots[1 - self.outgoing].index
    }

    /// Current phase of the cycle.
    #[must_use]
    pub const fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Whether work is scheduled.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether shuffle selection is in effect. Lists of two or fewer
    /// captions never shuffle.
    #[must_use]
    pub const fn is_shuffling(&self) -> bool {
        self.shuffle
    }

    /// Enable or disable shuffle selection.
    ///
    /// During a hold the queued caption is re-picked under the new policy,
    /// still avoiding the shown caption and the one before it.
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle && self.captions.len() > 2;
        if self.phase != FadePhase::Hold {
            return;
        }
        let next = self.choose_next();
        self.slots[1 - self.outgoing].index = next;
    }

    /// Fade style in effect.
    #[must_use]
    pub const fn fade_style(&self) -> FadeStyle {
        self.fade_style
    }

    /// Choose between ramped and instant transitions. A fade already under
    /// way finishes in the style it started with.
    pub fn set_fade_style(&mut self, style: FadeStyle) {
        self.fade_style = style;
    }

    /// Set the time a caption stays fully shown.
    pub fn set_hold_duration_ms(&mut self, ms: u64) {
        self.hold_duration_ms = ms;
    }

    /// Set the time between fade ticks (at least 1ms).
    pub fn set_tick_ms(&mut self, ms: u64) {
        self.tick_ms = ms.max(1);
    }

    /// Set the duration of one ramp (at least 1ms).
    pub fn set_fade_duration_ms(&mut self, ms: u64) {
        self.fade_duration_ms = ms.max(1);
    }

    fn raw_fade_step(&self) -> u64 {
        let fraction = self.tick_ms as f64 / self.fade_duration_ms as f64;
        (fraction * 255.0).floor().min(255.0) as u64
    }

    /// Alpha change per fade tick, between 1 and 255.
    #[must_use]
    pub fn fade_step(&self) -> u8 {
        self.raw_fade_step().clamp(1, 255) as u8
    }

    /// Text color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Set the text color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.host.request_redraw();
    }

    /// Font size in pixels.
    #[must_use]
    pub const fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Set the font size in pixels.
    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size;
        self.host.request_remeasure();
    }

    /// The host receiving render requests.
    pub const fn host(&self) -> &H {
        &self.host
    }

    // -------------------------------------------------------------------------
    // Layout and painting
    // -------------------------------------------------------------------------

    /// Size needed for the wider of the two slot captions, one line tall.
    pub fn measure(&self, width: MeasureSpec, height: MeasureSpec, metrics: &dyn TextMetrics) -> Size {
        let widest = self
            .slots
            .iter()
            .map(|slot| metrics.text_width(&self.captions[slot.index], self.text_size))
            .fold(0.0_f32, f32::max);
        Size::new(
            width.resolve(widest),
            height.resolve(metrics.ascent(self.text_size)),
        )
    }

    /// Draw every visible slot centered horizontally in `bounds`.
    pub fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect, metrics: &dyn TextMetrics) {
        let baseline =
            bounds.y + metrics.ascent(self.text_size) - metrics.descent(self.text_size);
        let anchor = Point::new(bounds.center().x, baseline);
        for slot in self.slots.iter().filter(|slot| slot.alpha > 0) {
            let style = TextStyle {
                size: self.text_size,
                color: self.color.with_alpha_u8(slot.alpha),
            };
            canvas.draw_text(&self.captions[slot.index], anchor, &style);
        }
    }
}

impl<S: Scheduler, H: Host> Animated for CaptionFader<S, H> {
    type Scheduler = S;

    fn handle_tick(&mut self, kind: TickKind) {
        match kind {
            TickKind::Advance => self.advance(),
            TickKind::Draw => self.host.request_redraw(),
        }
    }

    fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: Scheduler, H: Host> std::fmt::Debug for CaptionFader<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFader")
            .field("captions", &self.captions.len())
            .field("slots", &self.slots)
            .field("phase", &self.phase)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Pad the caption list to at least two entries.
fn normalize_captions(mut captions: Vec<String>) -> Vec<String> {
    match captions.len() {
        0 => vec![String::new(), String::new()],
        1 => {
            captions.push(captions[0].clone());
            captions
        }
        _ => captions,
    }
}

/// First index after `current`, in wrap-around order, that is not `previous`.
fn sequential_excluding(len: usize, current: usize, previous: Option<usize>) -> usize {
    (1..len)
        .map(|offset| (current + offset) % len)
        .find(|&candidate| Some(candidate) != previous)
        .unwrap_or((current + 1) % len)
}
