//! Evaluation of a single field rule against one record.
//!
//! Type mismatches are not errors: `$gt` on a string field, `$in` with a
//! non-array operand, or any operator on an absent field simply evaluates to
//! false.

use serde_json::Value;
use siftlog_log::Record;

use crate::query::{FieldRule, Operator};
use crate::value::{as_number, scalar_eq};

/// Returns true if every operator in `rule` holds for `record[field]`.
///
/// An empty rule holds for every record, including ones without the field.
#[must_use]
pub fn evaluate(record: &Record, field: &str, rule: &FieldRule) -> bool {
    let value = record.get(field);
    rule.operators.iter().all(|op| operator_holds(value, op))
}

fn operator_holds(value: Option<&Value>, op: &Operator) -> bool {
    let Some(value) = value else {
        return false;
    };

    match op {
        Operator::Eq(operand) => scalar_eq(value, operand),
        Operator::Gt(operand) => compare(value, operand, |a, b| a > b),
        Operator::Lt(operand) => compare(value, operand, |a, b| a < b),
        Operator::In(Value::Array(members)) => members.iter().any(|m| scalar_eq(value, m)),
        Operator::In(_) => false,
    }
}

fn compare(value: &Value, operand: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(value), as_number(operand)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
