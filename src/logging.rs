//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr.
///
/// Uses the level from `RUST_LOG`, or `default_level` when it is unset.
/// Logs go to stderr so stdout stays clean for JSON output.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
