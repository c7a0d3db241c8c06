//! Whole-log loading.
//!
//! Every call performs one full read of the backing store. Nothing is cached
//! between calls, so a store that changes on disk is picked up by the next load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::reader::LogReader;
use crate::record::Record;

/// Loads every record of the log file at `path`, in file order.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened or read, or a
/// malformed-entry error for the first record line that fails to parse.
pub async fn load(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).await?;
    let records = load_from_reader(file).await?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded record log");
    Ok(records)
}

/// Loads every record readable from `reader`, in order.
///
/// # Errors
///
/// Same as [`load`].
pub async fn load_from_reader<R: AsyncRead + Unpin>(reader: R) -> Result<Vec<Record>> {
    LogReader::new(reader).read_all().await
}

/// A place records can be loaded from.
///
/// Implementations must re-read their backing data on every call to
/// [`load`](LogSource::load).
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Loads the complete record set.
    async fn load(&self) -> Result<Vec<Record>>;

    /// Human-readable description for log messages.
    fn describe(&self) -> String;
}

/// A log stored in a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for the log file at `path`. The file is not opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSource for FileSource {
    async fn load(&self) -> Result<Vec<Record>> {
        load(&self.path).await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A log held in memory as text.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    text: String,
}

impl MemorySource {
    /// Creates a source over the given log text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl LogSource for MemorySource {
    async fn load(&self) -> Result<Vec<Record>> {
        load_from_reader(self.text.as_bytes()).await
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.text.len())
    }
}
