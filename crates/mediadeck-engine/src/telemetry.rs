//! Tracing setup for hosts embedding the engine.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str =
    "info,mediadeck_engine=debug,mediadeck_index=info,mediadeck_buffers=info";

/// Install a global `fmt` subscriber that respects `RUST_LOG`.
///
/// Returns `false` when a subscriber was already installed (for example by
/// the host application), in which case nothing changes.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Mediadeck engine v{} tracing initialised", env!("CARGO_PKG_VERSION"));
    }
    installed
}
