//! Error types for siftlog-log operations.

use std::io;
use thiserror::Error;

/// The error type for reading a record log.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading the log.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A record-tagged line whose payload is not a JSON object.
    ///
    /// One malformed entry aborts the whole read; entries are never skipped.
    #[error("malformed entry at line {line_number}: {source}")]
    MalformedEntry {
        /// The 1-based line number of the offending entry.
        line_number: usize,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the line number for entry-level errors.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::MalformedEntry { line_number, .. } => Some(*line_number),
            Self::Io(_) => None,
        }
    }
}

/// A specialized Result type for siftlog-log operations.
pub type Result<T> = std::result::Result<T, Error>;
