//! Logging setup for hosts and tools.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. `RUST_LOG` always wins. Without it, release builds show
//! warnings and up, debug builds show debug and up.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directive(release: bool) -> &'static str {
    if release {
        "warn"
    } else {
        "debug"
    }
}

/// Install a formatted subscriber on stderr. Later calls are ignored.
pub fn init(release: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(release)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
