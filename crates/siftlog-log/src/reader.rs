//! Line-by-line reading of record logs.
//!
//! This module provides async reading of a tagged log with buffering and
//! line number tracking for error reporting.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::entry::{EntryKind, parse_bytes};
use crate::error::Result;
use crate::record::Record;

/// Async reader for tagged record logs.
///
/// `LogReader` wraps an async reader in a [`BufReader`] and yields the records
/// of the log in file order. Lines that are not record entries are skipped.
/// It tracks line numbers so that parse failures point at the offending line.
///
/// # Type Parameters
///
/// * `R` - The underlying async reader type. Must implement [`AsyncRead`] and [`Unpin`].
///
/// # Examples
///
/// ```no_run
/// use siftlog_log::LogReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("store.log").await?;
/// let mut reader = LogReader::new(file);
/// while let Some(record) = reader.next_record().await? {
///     println!("{:?}", record.get("name"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct LogReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based counting, 0 before any lines are read) for error reporting.
    line_number: usize,
    /// Lines passed over because they were not record entries.
    skipped: usize,
    /// Reused line buffer. Lines are kept as raw bytes until classified.
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LogReader<R> {
    /// Creates a new `LogReader` wrapping the given async reader.
    ///
    /// Line numbering uses 1-based indexing: the counter starts at 0 and increments
    /// after each line is read, so the first line read is numbered 1.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            skipped: 0,
            buf: Vec::new(),
        }
    }

    /// Creates a new `LogReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            skipped: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns how many non-record lines have been skipped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Reads the next raw line, without its trailing newline.
    ///
    /// The line is not decoded; lines that are not valid UTF-8 are returned
    /// as-is. Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the underlying read fails.
    pub async fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        Ok(Some(self.buf.as_slice()))
    }

    /// Reads up to and including the next record entry.
    ///
    /// Non-record lines are skipped. Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an IO error if reading fails, or
    /// [`Error::MalformedEntry`](crate::Error::MalformedEntry) if a record
    /// line cannot be parsed.
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            let line_number = self.line_number + 1;
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };

            match EntryKind::of_bytes(line) {
                EntryKind::Record => return parse_bytes(line, line_number),
                kind => {
                    tracing::trace!(line_number, ?kind, "skipping non-record line");
                    self.skipped += 1;
                }
            }
        }
    }

    /// Reads every remaining record, in file order.
    ///
    /// # Errors
    ///
    /// Fails on the first IO error or malformed entry; no partial result is returned.
    pub async fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        tracing::debug!(
            records = records.len(),
            skipped = self.skipped,
            lines = self.line_number,
            "finished reading log"
        );
        Ok(records)
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn new_reader_starts_at_line_zero() {
        let reader = LogReader::new(Cursor::new(b""));
        assert_eq!(reader.line_number(), 0);
        assert_eq!(reader.skipped(), 0);
    }

    #[tokio::test]
    async fn next_line_strips_newline_and_counts() {
        let mut reader = LogReader::new(Cursor::new(b"first\nsecond"));

        assert_eq!(reader.next_line().await.unwrap(), Some(b"first".as_slice()));
        assert_eq!(reader.line_number(), 1);
        assert_eq!(reader.next_line().await.unwrap(), Some(b"second".as_slice()));
        assert_eq!(reader.line_number(), 2);
        assert_eq!(reader.next_line().await.unwrap(), None);
        assert_eq!(reader.line_number(), 2);
    }

    #[tokio::test]
    async fn next_record_skips_other_entries() {
        let data = "X{\"a\":0}\n\nE{\"a\":1}\nD{\"a\":2}\nE{\"a\":3}\n";
        let mut reader = LogReader::new(Cursor::new(data.as_bytes()));

        let first = reader.next_record().await.unwrap().unwrap();
        assert_eq!(first.get("a"), Some(&json!(1)));
        assert_eq!(reader.line_number(), 3);

        let second = reader.next_record().await.unwrap().unwrap();
        assert_eq!(second.get("a"), Some(&json!(3)));
        assert_eq!(reader.skipped(), 3);

        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_all_reports_malformed_line_number() {
        let data = "E{\"a\":1}\nX\nE{broken\nE{\"a\":2}\n";
        let mut reader = LogReader::new(Cursor::new(data.as_bytes()));

        let err = reader.read_all().await.unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { line_number: 3, .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_on_skipped_lines_does_not_abort() {
        let data: &[u8] = b"E{\"a\":1}\nX\xff\xfe\n\xff\nE{\"a\":2}\n";
        let mut reader = LogReader::new(Cursor::new(data));

        let records = reader.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("a"), Some(&json!(2)));
        assert_eq!(reader.skipped(), 2);
    }

    #[tokio::test]
    async fn invalid_utf8_in_record_is_malformed_not_io() {
        let data: &[u8] = b"E{\"a\":1}\nE{\"a\":\"\xff\"}\n";
        let mut reader = LogReader::new(Cursor::new(data));

        let err = reader.read_all().await.unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { line_number: 2, .. }));
    }

    #[tokio::test]
    async fn with_capacity_reads_long_lines() {
        let long = "x".repeat(10_000);
        let data = format!("E{{\"text\":\"{long}\"}}\n");
        let mut reader = LogReader::with_capacity(Cursor::new(data.into_bytes()), 16);

        let records = reader.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("text"), Some(&json!(long)));
    }
}
