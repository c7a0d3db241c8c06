//! Full-text matching over string fields.
//!
//! A phrase matches a field when it occurs as a whole word (bounded by
//! non-word characters or the ends of the string), ignoring case. The phrase
//! is matched literally: characters such as `.` or `(` have no pattern
//! meaning. Word characters are Unicode word characters, so `café` is one
//! word and `caf` does not match inside it.

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use siftlog_log::Record;

use crate::error::{Error, Result};

/// Which fields full-text search looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TextScope {
    /// Every top-level string field.
    #[default]
    AllStrings,
    /// Only the listed top-level fields, when they hold strings.
    Fields(Vec<String>),
}

impl TextScope {
    fn includes(&self, field: &str) -> bool {
        match self {
            Self::AllStrings => true,
            Self::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }
}

/// A compiled whole-word search for one phrase.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    pattern: Regex,
    scope: TextScope,
}

impl TextMatcher {
    /// Compiles a matcher for `phrase`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the pattern cannot be compiled
    /// (for example a phrase exceeding the regex size limit).
    pub fn new(phrase: &str, scope: TextScope) -> Result<Self> {
        let literal = regex::escape(&phrase.to_lowercase());
        let pattern = RegexBuilder::new(&format!(r"\b{literal}\b"))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidQuery(format!("cannot search for '{phrase}': {e}")))?;
        Ok(Self { pattern, scope })
    }

    /// Returns true if any in-scope string field contains the phrase as a whole word.
    ///
    /// Non-string fields are skipped.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record.fields().any(|(name, value)| match value {
            Value::String(text) => self.scope.includes(name) && self.pattern.is_match(text),
            _ => false,
        })
    }
}

/// Keeps the records `matcher` matches, in order.
#[must_use]
pub fn search<'a>(records: &[&'a Record], matcher: &TextMatcher) -> Vec<&'a Record> {
    records
        .iter()
        .copied()
        .filter(|record| matcher.matches(record))
        .collect()
}
