//! Post-filter shaping: sorting and projection.
//!
//! An [`EndRule`] is written as JSON next to the query:
//!
//! ```json
//! {"sort": {"age": -1}, "projection": {"name": 1}}
//! ```
//!
//! Sorting runs one stable pass per listed field, in listed order. Each pass
//! reorders the output of the previous one, so the last listed field decides
//! the final order and earlier fields only break its ties.

use std::str::FromStr;

use serde_json::{Map, Value};
use siftlog_log::Record;

use crate::error::{Error, Result};
use crate::query::type_name;
use crate::value::coerce_number;

/// Direction of one sort pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first (`1`).
    Ascending,
    /// Largest first (`-1`).
    Descending,
}

impl SortDirection {
    #[allow(clippy::float_cmp)]
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        match value.as_f64() {
            Some(d) if d == 1.0 => Ok(Self::Ascending),
            Some(d) if d == -1.0 => Ok(Self::Descending),
            _ => Err(Error::InvalidQuery(format!(
                "sort direction for '{field}' must be 1 or -1, got {value}"
            ))),
        }
    }
}

/// Sort and projection applied after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndRule {
    /// Sort passes in the order they run.
    pub sort: Vec<(String, SortDirection)>,
    /// Fields to keep, in output order. `None` keeps whole records.
    pub projection: Option<Vec<String>>,
}

impl EndRule {
    /// Creates an end rule that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort pass on `field`.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    /// Adds `field` to the projection.
    #[must_use]
    pub fn project(mut self, field: impl Into<String>) -> Self {
        self.projection
            .get_or_insert_with(Vec::new)
            .push(field.into());
        self
    }

    /// Parses an end rule from a JSON value.
    ///
    /// `sort` maps field to `1` or `-1`. `projection` maps field to any flag;
    /// every listed key is kept whatever its flag says. Other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] when the value or either directive is
    /// not an object, or a sort direction is not `1`/`-1`.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = expect_object("end rule", value)?;

        let mut rule = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "sort" => {
                    for (field, direction) in expect_object("sort", value)? {
                        let direction = SortDirection::from_value(&field, &direction)?;
                        rule.sort.push((field, direction));
                    }
                }
                "projection" => {
                    let fields = expect_object("projection", value)?.into_iter();
                    rule.projection = Some(fields.map(|(field, _)| field).collect());
                }
                other => tracing::warn!(key = other, "ignoring unknown end rule directive"),
            }
        }
        Ok(rule)
    }

    /// Merges `other` into this rule: its sort passes run after ours and its
    /// projection, when present, replaces ours.
    #[must_use]
    pub fn merge(mut self, other: EndRule) -> Self {
        self.sort.extend(other.sort);
        if other.projection.is_some() {
            self.projection = other.projection;
        }
        self
    }
}

impl FromStr for EndRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| Error::InvalidQuery(format!("end rule is not valid JSON: {e}")))?;
        Self::from_value(value)
    }
}

fn expect_object(what: &str, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidQuery(format!(
            "{what} must be an object, got {}",
            type_name(&other)
        ))),
    }
}

/// Sorts `records` in place, one stable pass per entry of `directions`.
///
/// Values are compared after [`coerce_number`]; values without a numeric
/// reading go after all numbers in an ascending pass and before them in a
/// descending one.
pub fn sort(records: &mut [&Record], directions: &[(String, SortDirection)]) {
    for (field, direction) in directions {
        records.sort_by(|a, b| {
            let ordering = coerce_number(a.get(field)).sort_cmp(&coerce_number(b.get(field)));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

/// Builds new objects holding only `fields`, in that order.
///
/// Fields a record does not have are left out of its projection.
#[must_use]
pub fn project(records: &[&Record], fields: &[String]) -> Vec<Map<String, Value>> {
    records
        .iter()
        .map(|record| {
            fields
                .iter()
                .filter_map(|field| record.get(field).map(|v| (field.clone(), v.clone())))
                .collect()
        })
        .collect()
}

/// Applies `end_rule` (sort, then projection) and returns owned output objects.
#[must_use]
pub fn shape(mut records: Vec<&Record>, end_rule: Option<&EndRule>) -> Vec<Map<String, Value>> {
    let Some(end_rule) = end_rule else {
        return records.into_iter().map(|r| r.as_map().clone()).collect();
    };

    sort(&mut records, &end_rule.sort);
    match &end_rule.projection {
        Some(fields) => project(&records, fields),
        None => records.into_iter().map(|r| r.as_map().clone()).collect(),
    }
}
