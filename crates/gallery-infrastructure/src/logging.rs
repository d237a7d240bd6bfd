//! Tracing subscriber setup for applications embedding the gallery client.

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered at `level`.
///
/// `RUST_LOG`, when set, takes precedence over `level`. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
