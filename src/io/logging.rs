use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use super::config_io;

/// Environment variable holding the log filter, e.g. `TODO_LOG=debug`
pub const LOG_ENV: &str = "TODO_LOG";
const LOG_FILE: &str = "todo.log";
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber writing to the state directory.
///
/// The terminal belongs to the UI, so nothing is ever logged to stdout or
/// stderr. Returns the writer guard, which must be held until exit so
/// buffered lines get flushed. Any failure leaves logging disabled.
pub fn init() -> Option<WorkerGuard> {
    init_in(&config_io::state_dir())
}

pub fn init_in(dir: &Path) -> Option<WorkerGuard> {
    std::fs::create_dir_all(dir).ok()?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Some(guard)
}
