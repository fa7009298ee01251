//! Startup error taxonomy
//!
//! Everything here is fatal: the process prints the error and exits with status 1.
//! Request-time failures never reach this type; they become HTTP responses.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Build directory '{}' not found.", .dir.display())]
    MissingRoot { dir: PathBuf },

    #[error("Root document '{}' not found.", .path.display())]
    MissingIndex { path: PathBuf },

    #[error("Invalid worker count 0: at least one worker thread is required")]
    NoWorkers,

    #[error("Invalid address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    LogFile(std::io::Error),

    #[error("Failed to build runtime: {0}")]
    Runtime(std::io::Error),
}

impl StartupError {
    /// Whether the operator should be told to produce the build output first
    pub const fn is_missing_build(&self) -> bool {
        matches!(self, Self::MissingRoot { .. } | Self::MissingIndex { .. })
    }
}
