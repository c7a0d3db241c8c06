//! Explicit comparison and numeric coercion rules for field values.
//!
//! Record fields are untyped JSON. Every comparison the engine makes goes
//! through the two functions here, so the rules live in one place:
//!
//! - [`scalar_eq`] is strict equality used by `$eq` and `$in`.
//! - [`coerce_number`] maps any field value to a [`Numeric`] for sorting.

use std::cmp::Ordering;

use serde_json::Value;

/// A field value coerced for numeric ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// A finite number.
    Number(f64),
    /// The value has no numeric interpretation.
    NotComparable,
}

impl Numeric {
    /// Total order used by sorting.
    ///
    /// Numbers compare numerically. `NotComparable` is equal to itself and
    /// greater than every number, so such records gather at the end of an
    /// ascending pass.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Number(_), Self::NotComparable) => Ordering::Less,
            (Self::NotComparable, Self::Number(_)) => Ordering::Greater,
            (Self::NotComparable, Self::NotComparable) => Ordering::Equal,
        }
    }
}

/// Coerces a field value to a number.
///
/// | value | result |
/// |---|---|
/// | number | its value |
/// | string | trimmed text parsed as a finite number; empty string is `0` |
/// | `true` / `false` | `1` / `0` |
/// | `null` | `0` |
/// | absent, array, object, other strings | `NotComparable` |
#[must_use]
pub fn coerce_number(value: Option<&Value>) -> Numeric {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Null) => Some(0.0),
        Some(Value::Array(_) | Value::Object(_)) | None => None,
    };

    match number {
        Some(n) if n.is_finite() => Numeric::Number(n),
        _ => Numeric::NotComparable,
    }
}

/// Strict equality between a field value and an operand.
///
/// Numbers are equal when their values are (`30` equals `30.0`), strings
/// when their contents are, booleans when they match. Every other pairing,
/// including mixed types, `null`, arrays and objects, is unequal.
#[must_use]
pub fn scalar_eq(field: &Value, operand: &Value) -> bool {
    match (field, operand) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

/// Returns the value as `f64` when it is a JSON number.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
