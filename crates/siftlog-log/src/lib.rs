//! Reader for tagged, line-delimited JSON record logs.
//!
//! A log is a text file with one entry per line. Lines whose first character
//! is the record tag `'E'` carry a JSON object payload; every other line is
//! reserved for other entry kinds and is skipped by this crate.
//!
//! ```text
//! E{"name":"Ann","age":30}
//! X{"ignored":true}
//! E{"name":"Bo","age":20}
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod load;
pub mod reader;
pub mod record;

pub use entry::{ENTRY_TAG, EntryKind, parse_bytes, parse_line};
pub use error::{Error, Result};
pub use load::{FileSource, LogSource, MemorySource, load, load_from_reader};
pub use reader::LogReader;
pub use record::Record;
