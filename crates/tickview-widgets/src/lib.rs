//! Animators built on tickview-core.

pub mod caption_fader;
pub mod lazy_load;
pub mod orientation;
pub mod pie_progress;

pub use caption_fader::{CaptionConfig, CaptionFader, CaptionSlot, FadePhase, FadeStyle};
pub use lazy_load::{LazyLoad, Loaded};
pub use orientation::{Orientation, OrientationTracker, Rotation};
pub use pie_progress::{PieConfig, PieProgress};
