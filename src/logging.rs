use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE: &str = "rsh.log";

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
///
/// `RUST_LOG` wins over the configured filter, which wins over `default`.
pub fn init(config: &LogConfig, default: &str) -> WorkerGuard {
    let (writer, guard) = match &config.directory {
        Some(dir) => {
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_deref().unwrap_or(default)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(config.directory.is_none()),
        )
        .with(filter)
        .with(tracing_error::ErrorLayer::default())
        .init();

    guard
}
