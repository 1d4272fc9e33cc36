//! Diagnostic logging to stderr.

use tracing::dispatcher;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the stderr subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `default_directive`
/// (`warn` for plain output, `off` while the full-screen TUI owns the
/// terminal).
pub fn init_logging(default_directive: &str) {
    if dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
