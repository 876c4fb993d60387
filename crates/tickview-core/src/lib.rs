//! Core types and traits for tickview animators.
//!
//! This crate provides the pieces every animator is built on:
//! - Scheduling: [`Scheduler`], [`TickKind`], and the virtual-clock [`ManualScheduler`]
//! - Render boundary: [`Host`] and [`Canvas`]
//! - Completion contract: [`CompletionListener`] and [`notify`]
//! - Values: [`Color`], [`Point`], [`Rect`], [`Size`], [`MeasureSpec`]
//! - Configuration: [`ColorSpec`], YAML loading, [`ConfigError`]

mod cancel;
mod canvas;
mod color;
mod completion;
pub mod config;
mod error;
mod geometry;
mod host;
pub mod logging;
mod measure;
pub mod scheduler;

pub use cancel::CancellationToken;
pub use canvas::{Canvas, DrawCommand, RecordingCanvas, TextStyle};
pub use color::{Color, ColorParseError};
pub use completion::{notify, CompletionListener, OnComplete};
pub use config::ColorSpec;
pub use error::ConfigError;
pub use geometry::{Point, Rect, Size};
pub use host::{Host, NullHost, RecordingHost};
pub use measure::{MeasureSpec, MonospaceMetrics, TextMetrics};
pub use scheduler::{drive, step, Animated, Due, ManualScheduler, Scheduler, TickKind, Ticket};
