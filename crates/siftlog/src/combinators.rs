//! `$and` / `$or` combinators and single-field filtering.
//!
//! All functions are pure filters over borrowed records: the input order is
//! preserved among survivors and the records themselves are never touched.

use siftlog_log::Record;

use crate::predicate::evaluate;
use crate::query::{FieldRule, RuleSet};

/// Returns true if every field rule in `rule_set` holds for `record`.
#[must_use]
pub fn rule_set_matches(record: &Record, rule_set: &RuleSet) -> bool {
    rule_set
        .rules
        .iter()
        .all(|(field, rule)| evaluate(record, field, rule))
}

/// Keeps records that satisfy every rule set.
///
/// With no rule sets every record is kept.
#[must_use]
pub fn and<'a>(records: &[&'a Record], rule_sets: &[RuleSet]) -> Vec<&'a Record> {
    records
        .iter()
        .copied()
        .filter(|record| rule_sets.iter().all(|set| rule_set_matches(record, set)))
        .collect()
}

/// Keeps records that satisfy at least one rule set.
///
/// With no rule sets no record is kept.
#[must_use]
pub fn or<'a>(records: &[&'a Record], rule_sets: &[RuleSet]) -> Vec<&'a Record> {
    records
        .iter()
        .copied()
        .filter(|record| rule_sets.iter().any(|set| rule_set_matches(record, set)))
        .collect()
}

/// Keeps records whose `field` satisfies `rule`.
#[must_use]
pub fn filter_field<'a>(records: &[&'a Record], field: &str, rule: &FieldRule) -> Vec<&'a Record> {
    records
        .iter()
        .copied()
        .filter(|record| evaluate(record, field, rule))
        .collect()
}
