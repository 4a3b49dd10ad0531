//! Logging bootstrap.
//!
//! Two sinks: a console layer at information and above, and a file layer at
//! debug and above writing to the configured log file. Records carry the
//! timestamp, thread id, level, and message. Log lines requested by the
//! request itself (`log_<level>` attributes) are emitted under
//! [`REQUEST_LOG_TARGET`], which the console layer excludes: those records
//! belong to the file logger alone.

use crate::error::ServerError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Target for log records a request asks for via its `log_<level>`
/// attributes. File sink only.
pub const REQUEST_LOG_TARGET: &str = "fidi_request_log";

/// Initialize both log sinks. Called once at startup, before any request
/// is accepted; a missing log directory or unwritable log file is fatal.
pub fn init(log_dir: &Path, log_path: &Path) -> Result<(), ServerError> {
    if !log_dir.is_dir() {
        return Err(ServerError::LogDirMissing {
            path: log_dir.to_path_buf(),
        });
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| ServerError::LogFileUnwritable {
            path: log_path.to_path_buf(),
            source,
        })?;

    let console_filter = Targets::new()
        .with_target(REQUEST_LOG_TARGET, LevelFilter::OFF)
        .with_default(LevelFilter::INFO);
    let console_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_filter(console_filter);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_thread_ids(true)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ServerError::LogInit(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_dir_is_fatal() {
        let err = init(
            Path::new("/definitely/not/a/directory"),
            Path::new("/definitely/not/a/directory/fidi_server.log"),
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::LogDirMissing { .. }));
    }
}
