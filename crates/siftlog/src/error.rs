//! Error types for siftlog operations.

use std::io;
use thiserror::Error;

/// The error type for siftlog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The record log could not be read or contained a malformed entry.
    #[error(transparent)]
    Log(#[from] siftlog_log::Error),

    /// The query or end rule is structurally invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error outside of log reading (configuration files).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for siftlog operations.
pub type Result<T> = std::result::Result<T, Error>;
