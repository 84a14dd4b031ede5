use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes the logging system with both console and file output.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must be kept alive for the file writer to flush.
pub fn init_logging(app: &str, config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fyyur_trivia={}", config.level)));

    // Without a writable log directory we still want console output.
    if let Err(e) = fs::create_dir_all(&config.directory) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout))
            .init();
        tracing::warn!("Log directory {} unavailable: {}", config.directory, e);
        return None;
    }

    let file_appender =
        tracing_appender::rolling::daily(&config.directory, format!("{app}.log"));
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    Some(guard)
}
