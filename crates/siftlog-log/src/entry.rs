//! Classification and parsing of individual log lines.

use crate::error::{Error, Result};
use crate::record::Record;

/// First character of a line that carries a record.
pub const ENTRY_TAG: char = 'E';

const ENTRY_TAG_BYTE: u8 = b'E';

/// The kind of a single log line, decided by its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A record entry (`'E'` tag).
    Record,
    /// An entry with some other tag. Reserved for kinds like deletions.
    Other(char),
    /// An empty line.
    Blank,
}

impl EntryKind {
    /// Classifies a line by its first character.
    ///
    /// # Examples
    ///
    /// ```
    /// use siftlog_log::EntryKind;
    ///
    /// assert_eq!(EntryKind::of(r#"E{"a":1}"#), EntryKind::Record);
    /// assert_eq!(EntryKind::of(r#"D{"a":1}"#), EntryKind::Other('D'));
    /// assert_eq!(EntryKind::of(""), EntryKind::Blank);
    /// ```
    #[must_use]
    pub fn of(line: &str) -> Self {
        match line.chars().next() {
            Some(ENTRY_TAG) => Self::Record,
            Some(tag) => Self::Other(tag),
            None => Self::Blank,
        }
    }

    /// Classifies a raw line by its first byte.
    ///
    /// Only the tag is inspected, so lines that are not valid UTF-8 can still
    /// be recognized and skipped. A non-UTF-8 leading byte is reported as
    /// [`char::REPLACEMENT_CHARACTER`].
    #[must_use]
    pub fn of_bytes(line: &[u8]) -> Self {
        match line.first() {
            None => Self::Blank,
            Some(&ENTRY_TAG_BYTE) => Self::Record,
            Some(_) => Self::Other(
                String::from_utf8_lossy(line)
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
            ),
        }
    }
}

/// Parses one line of the log.
///
/// Returns `Ok(None)` for lines that are not record entries. The payload
/// following the tag must be a JSON object; anything else is reported as
/// [`Error::MalformedEntry`] carrying `line_number`.
///
/// # Errors
///
/// Returns [`Error::MalformedEntry`] when a record line's payload fails to parse.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Record>> {
    parse_bytes(line.as_bytes(), line_number)
}

/// Parses one raw line of the log.
///
/// Same as [`parse_line`], but the line does not need to be UTF-8. Only the
/// payload of record entries is decoded; invalid UTF-8 there is a malformed
/// entry.
///
/// # Errors
///
/// Returns [`Error::MalformedEntry`] when a record line's payload fails to parse.
pub fn parse_bytes(line: &[u8], line_number: usize) -> Result<Option<Record>> {
    if EntryKind::of_bytes(line) != EntryKind::Record {
        return Ok(None);
    }

    serde_json::from_slice(&line[1..])
        .map(Some)
        .map_err(|source| Error::MalformedEntry {
            line_number,
            source,
        })
}
