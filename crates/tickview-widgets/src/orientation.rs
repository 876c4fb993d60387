//! Device orientation tracking.
//!
//! Raw sensor angles are snapped to one of four quadrants. When the quadrant
//! changes the tracker emits a [`Rotation`] the host can apply to its views
//! so their content stays upright.

use tracing::debug;

/// Degrees either side of a quadrant's center that still count as inside it.
pub const THRESHOLD_DEGREES: u32 = 15;

/// Default length of an emitted rotation.
pub const DEFAULT_ROTATION_MS: u64 = 250;

/// Device orientation quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Upright, sensor angle 0
    #[default]
    PortraitUp,
    /// Rotated left, sensor angle 270
    LandscapeUp,
    /// Upside down, sensor angle 180
    PortraitDown,
    /// Rotated right, sensor angle 90
    LandscapeDown,
}

impl Orientation {
    const fn center_degrees(self) -> u32 {
        match self {
            Self::PortraitUp => 0,
            Self::LandscapeUp => 270,
            Self::PortraitDown => 180,
            Self::LandscapeDown => 90,
        }
    }

    /// Snap a sensor angle to a quadrant, or `None` when it sits between
    /// quadrants.
    #[must_use]
    pub fn classify(degrees: u32) -> Option<Self> {
        let degrees = degrees % 360;
        [
            Self::LandscapeUp,
            Self::PortraitUp,
            Self::LandscapeDown,
            Self::PortraitDown,
        ]
        .into_iter()
        .find(|quadrant| angular_distance(degrees, quadrant.center_degrees()) <= THRESHOLD_DEGREES)
    }

    /// Start and end view rotation, in degrees, for turning from `self` to
    /// `to`. `None` when the quadrant is unchanged.
    #[must_use]
    pub const fn rotation_to(self, to: Self) -> Option<(f32, f32)> {
        use Orientation::{LandscapeDown as LD, LandscapeUp as LU, PortraitDown as PD, PortraitUp as PU};
        let pair = match (self, to) {
            (PU, LU) => (0.0, 90.0),
            (PD, LU) => (180.0, 90.0),
            (LD, LU) => (-90.0, 90.0),
            (LU, PU) => (90.0, 0.0),
            (LD, PU) => (-90.0, 0.0),
            (PD, PU) => (180.0, 0.0),
            (PU, LD) => (0.0, -90.0),
            (PD, LD) => (-180.0, -90.0),
            (LU, LD) => (90.0, -90.0),
            (LU, PD) => (90.0, 180.0),
            (LD, PD) => (-90.0, -180.0),
            (PU, PD) => (0.0, 180.0),
            _ => return None,
        };
        Some(pair)
    }
}

fn angular_distance(a: u32, b: u32) -> u32 {
    let diff = a.abs_diff(b) % 360;
    diff.min(360 - diff)
}

/// A view rotation to animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Quadrant left
    pub from: Orientation,
    /// Quadrant entered
    pub to: Orientation,
    /// Starting view angle in degrees
    pub from_degrees: f32,
    /// Final view angle in degrees
    pub to_degrees: f32,
    /// Animation length
    pub duration_ms: u64,
}

/// Follows sensor updates and reports quadrant changes.
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    current: Orientation,
    paused: bool,
    duration_ms: u64,
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationTracker {
    /// Tracker starting upright and emitting.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Orientation::PortraitUp,
            paused: false,
            duration_ms: DEFAULT_ROTATION_MS,
        }
    }

    /// Use a different rotation length.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Last quadrant seen.
    #[must_use]
    pub const fn current(&self) -> Orientation {
        self.current
    }

    /// Stop emitting rotations. Quadrant changes are still recorded.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Emit rotations again.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether emission is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feed one sensor reading; `None` means the angle is unknown.
    pub fn on_orientation_changed(&mut self, degrees: Option<u32>) -> Option<Rotation> {
        let to = Orientation::classify(degrees?)?;
        let from = std::mem::replace(&mut self.current, to);
        let (from_degrees, to_degrees) = from.rotation_to(to)?;
        debug!(?from, ?to, paused = self.paused, "orientation changed");
        if self.paused {
            return None;
        }
        Some(Rotation {
            from,
            to,
            from_degrees,
            to_degrees,
            duration_ms: self.duration_ms,
        })
    }
}
