use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE: &str = "tudu.log";

/// File-backed logging for the TUI. The terminal belongs to ratatui,
/// so everything goes to `<state dir>/tudu.log`; failures are mirrored
/// in the notice bar by the caller. The returned guard must stay alive
/// for the duration of the process or buffered lines are lost.
pub fn init_file_logging(state_dir: &Path) -> io::Result<WorkerGuard> {
    fs::create_dir_all(state_dir)?;
    let appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tudu=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init: a second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_the_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let guard = init_file_logging(dir.path()).expect("init logging");
        tracing::info!("logging smoke line");
        drop(guard);
        assert!(dir.path().join(LOG_FILE).exists());
    }
}
