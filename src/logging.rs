//! Logging setup.
//!
//! Logs go to **stderr** so stdout stays free for the process that
//! launched the SDK. The filter comes from `RUST_LOG`, defaulting to
//! `tfw_sdk=info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "tfw_sdk=info";

/// Install the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs anything.
/// Returns `false` if a subscriber was already set.
pub fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()
        .is_ok()
}
