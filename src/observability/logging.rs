use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "coverage_sheets=info";

/// Initializes logging with console output and a daily-rotated JSON file
/// under `logs/`. Keep the returned guard alive for the life of the process
/// so buffered file logs are flushed on exit.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let (file_layer, guard) = match fs::create_dir_all("logs") {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily("logs", "coverage.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_installs_console_and_file_layers() {
        let guard = init_logging();
        assert!(guard.is_some());
        tracing::info!("logging initialized");
    }
}
