//! Query execution.
//!
//! [`Engine::find`] loads the full record set from its source, narrows it
//! clause by clause in query order, then applies the end rule. Nothing is
//! kept between calls: every `find` re-reads the store.

use std::path::PathBuf;

use serde_json::{Map, Value};
use siftlog_log::{FileSource, LogSource, Record};

use crate::combinators::{and, filter_field, or};
use crate::config::Config;
use crate::error::Result;
use crate::query::{Clause, Query};
use crate::shape::{EndRule, shape};
use crate::text::{TextMatcher, TextScope, search};

/// Query engine over one record log.
///
/// # Examples
///
/// ```no_run
/// use siftlog::{Engine, EndRule, Query};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> siftlog::Result<()> {
/// let engine = Engine::open("store.log", vec!["name".to_string()]);
/// let query: Query = r#"{"age": {"$gt": 21}}"#.parse()?;
/// let end_rule: EndRule = r#"{"sort": {"age": -1}}"#.parse()?;
///
/// for record in engine.find(&query, Some(&end_rule)).await? {
///     println!("{}", serde_json::Value::Object(record));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Engine<S = FileSource> {
    source: S,
    text_fields: Vec<String>,
    text_scope: TextScope,
}

impl Engine<FileSource> {
    /// Creates an engine over the log file at `path`.
    ///
    /// `text_fields` lists the fields intended for full-text search. The
    /// search still covers every string field unless the engine is switched to
    /// [`TextScope::Fields`] with [`Engine::restrict_text_to_fields`].
    pub fn open(path: impl Into<PathBuf>, text_fields: Vec<String>) -> Self {
        Self::with_source(FileSource::new(path), text_fields)
    }

    /// Creates an engine from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let engine = Self::open(config.store.clone(), config.text_fields.clone());
        if config.restricts_text_search() {
            engine.restrict_text_to_fields()
        } else {
            engine
        }
    }
}

impl<S: LogSource> Engine<S> {
    /// Creates an engine over any record source.
    pub fn with_source(source: S, text_fields: Vec<String>) -> Self {
        Self {
            source,
            text_fields,
            text_scope: TextScope::AllStrings,
        }
    }

    /// Limits `$text` to the configured text fields.
    #[must_use]
    pub fn restrict_text_to_fields(mut self) -> Self {
        self.text_scope = TextScope::Fields(self.text_fields.clone());
        self
    }

    /// Sets the `$text` scope directly.
    #[must_use]
    pub fn with_text_scope(mut self, scope: TextScope) -> Self {
        self.text_scope = scope;
        self
    }

    /// The fields named for full-text search at construction.
    #[must_use]
    pub fn text_fields(&self) -> &[String] {
        &self.text_fields
    }

    /// The scope `$text` clauses search.
    #[must_use]
    pub fn text_scope(&self) -> &TextScope {
        &self.text_scope
    }

    /// The record source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs `query` against a fresh load of the store.
    ///
    /// Results keep store order unless `end_rule` sorts them, and are whole
    /// records unless `end_rule` projects them.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read, if a record entry is malformed, or
    /// if a `$text` phrase cannot be compiled. No partial result is returned.
    pub async fn find(
        &self,
        query: &Query,
        end_rule: Option<&EndRule>,
    ) -> Result<Vec<Map<String, Value>>> {
        let records = self.source.load().await?;
        tracing::debug!(
            source = %self.source.describe(),
            records = records.len(),
            "loaded records for query"
        );

        let matched = self.filter(&records, query)?;
        let total = records.len();
        let kept = matched.len();
        let output = shape(matched, end_rule);

        tracing::info!(total, matched = kept, "query finished");
        Ok(output)
    }

    /// Parses `query` and the optional `end_rule` from JSON text and runs them.
    ///
    /// # Errors
    ///
    /// Same as [`find`](Self::find), plus [`Error::InvalidQuery`](crate::Error::InvalidQuery)
    /// for unparsable input.
    pub async fn find_json(
        &self,
        query: &str,
        end_rule: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>> {
        let query: Query = query.parse()?;
        let end_rule = end_rule.map(str::parse::<EndRule>).transpose()?;
        self.find(&query, end_rule.as_ref()).await
    }

    fn filter<'a>(&self, records: &'a [Record], query: &Query) -> Result<Vec<&'a Record>> {
        let mut current: Vec<&Record> = records.iter().collect();

        for clause in &query.clauses {
            current = match clause {
                Clause::And(rule_sets) => and(&current, rule_sets),
                Clause::Or(rule_sets) => or(&current, rule_sets),
                Clause::Text(phrase) => {
                    let matcher = TextMatcher::new(phrase, self.text_scope.clone())?;
                    search(&current, &matcher)
                }
                Clause::Field { field, rule } => filter_field(&current, field, rule),
            };
            tracing::debug!(clause = clause_name(clause), remaining = current.len(), "applied clause");
        }

        Ok(current)
    }
}

fn clause_name(clause: &Clause) -> &str {
    match clause {
        Clause::And(_) => "$and",
        Clause::Or(_) => "$or",
        Clause::Text(_) => "$text",
        Clause::Field { field, .. } => field,
    }
}
