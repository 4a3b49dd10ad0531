//! Server error types.
//!
//! Only fatal initialization problems surface as errors; everything that
//! happens while serving a request is reported through the response or the
//! logs instead.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal initialization errors. `main` returns these so the process exits
/// nonzero on a broken environment.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("log directory {path} does not exist or is not a directory")]
    LogDirMissing { path: PathBuf },

    #[error("cannot open log file {path}: {source}")]
    LogFileUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    LogInit(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("i/o error while serving: {0}")]
    Serve(#[from] io::Error),
}
