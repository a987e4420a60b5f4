//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. Skipped symbols are logged at `warn`, so
/// that is the quiet default; `verbose` raises it to `debug`. `RUST_LOG`
/// overrides both.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "stockpulse=debug" } else { "stockpulse=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .try_init();
}
