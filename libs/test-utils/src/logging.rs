//! Test logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize a tracing subscriber for tests. Safe to call from every test;
/// repeated initialization is ignored.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
