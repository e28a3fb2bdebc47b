//! Tracing initialisation
//!
//! Library code only emits `tracing` events. Binaries and test harnesses
//! embedding slidex call [`init`] once to print them to stderr.

use tracing_subscriber::EnvFilter;

use crate::settings::LoggingSettings;

/// Install a stderr fmt subscriber
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a global
/// subscriber was already installed, which is not an error.
pub fn init(settings: &LoggingSettings) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(settings))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn filter_for(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
