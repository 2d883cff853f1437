//! File logging.
//!
//! The terminal belongs to the TUI, so log lines go to `.courtroom/courtroom.log`
//! through a non-blocking appender. The filter is read from `COURTROOM_LOG`
//! (`info` when unset or invalid).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COURTROOM_LOG";
pub const LOG_FILE: &str = "courtroom.log";

/// Installs the global subscriber.
///
/// The returned guard flushes buffered lines when dropped; hold it until exit.
pub fn init(dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}
