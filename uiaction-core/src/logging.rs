//! Tracing subscriber set-up.
//!
//! Console output goes to stderr through a `fmt` layer. When a log directory
//! is configured, a JSON-lines file layer is added on a rolling appender,
//! written from a background worker; keep the returned guard alive until exit.

use std::sync::Once;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogRotation, LoggingConfig};
use crate::error::{ActionError, ActionResult};

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> ActionResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(ActionError::logging)?;

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            let rotation = match config.rotation {
                LogRotation::Never => Rotation::NEVER,
                LogRotation::Hourly => Rotation::HOURLY,
                LogRotation::Daily => Rotation::DAILY,
            };

            let appender = RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(config.file_prefix.as_str())
                .filename_suffix("jsonl")
                .max_log_files(config.max_log_files)
                .build(dir)
                .map_err(ActionError::logging)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_thread_ids(true)
                .with_writer(non_blocking)
                .boxed();

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(ActionError::logging)?;

    Ok(guard)
}

static TEST_INIT: Once = Once::new();

/// Console logging for tests and benches; safe to call repeatedly.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
