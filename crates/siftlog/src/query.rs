//! Query model and parsing.
//!
//! A query is a JSON object. Each top-level key becomes one [`Clause`], kept
//! in the order the keys were written:
//!
//! ```json
//! {
//!   "$or":   [{"age": {"$lt": 22}}, {"name": {"$eq": "Cy"}}],
//!   "$and":  [{"age": {"$gt": 10}}],
//!   "$text": "ann",
//!   "age":   {"$gt": 21, "$lt": 40}
//! }
//! ```
//!
//! Keys other than `$and`, `$or` and `$text` are field names. They are not
//! checked against the data, so a misspelled combinator silently becomes a
//! filter on a field that does not exist.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Reserved key for the AND combinator.
pub const AND_KEY: &str = "$and";
/// Reserved key for the OR combinator.
pub const OR_KEY: &str = "$or";
/// Reserved key for full-text search.
pub const TEXT_KEY: &str = "$text";

/// A single comparison inside a field rule.
///
/// Operands are kept as raw JSON. A mismatch between operand and field type
/// makes the comparison false when evaluated; it is never a parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `$eq`: strict equality.
    Eq(Value),
    /// `$gt`: numeric greater-than.
    Gt(Value),
    /// `$lt`: numeric less-than.
    Lt(Value),
    /// `$in`: membership in an array operand.
    In(Value),
}

impl Operator {
    /// Builds an operator from its key, or `None` for unknown keys.
    fn from_key(key: &str, operand: Value) -> Option<Self> {
        match key {
            "$eq" => Some(Self::Eq(operand)),
            "$gt" => Some(Self::Gt(operand)),
            "$lt" => Some(Self::Lt(operand)),
            "$in" => Some(Self::In(operand)),
            _ => None,
        }
    }

    /// The operator's key as written in a query.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq(_) => "$eq",
            Self::Gt(_) => "$gt",
            Self::Lt(_) => "$lt",
            Self::In(_) => "$in",
        }
    }
}

/// The operators constraining one field. All of them must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRule {
    /// Operators in the order they were written.
    pub operators: Vec<Operator>,
}

impl FieldRule {
    /// Creates an empty rule, which every record satisfies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an `$eq` operator.
    #[must_use]
    pub fn equals(mut self, operand: impl Into<Value>) -> Self {
        self.operators.push(Operator::Eq(operand.into()));
        self
    }

    /// Adds a `$gt` operator.
    #[must_use]
    pub fn greater_than(mut self, operand: impl Into<Value>) -> Self {
        self.operators.push(Operator::Gt(operand.into()));
        self
    }

    /// Adds a `$lt` operator.
    #[must_use]
    pub fn less_than(mut self, operand: impl Into<Value>) -> Self {
        self.operators.push(Operator::Lt(operand.into()));
        self
    }

    /// Adds an `$in` operator over the given values.
    #[must_use]
    pub fn is_in<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.operators.push(Operator::In(Value::Array(values)));
        self
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidQuery(format!(
                    "rule for field '{field}' must be an object, got {}",
                    type_name(&other)
                )));
            }
        };

        let mut operators = Vec::with_capacity(map.len());
        for (key, operand) in map {
            match Operator::from_key(&key, operand) {
                Some(op) => operators.push(op),
                None => tracing::warn!(field, operator = %key, "ignoring unknown operator"),
            }
        }
        Ok(Self { operators })
    }
}

/// A set of field rules that must all hold. One element of `$and` / `$or`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// `(field, rule)` pairs in the order they were written.
    pub rules: Vec<(String, FieldRule)>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `field`.
    #[must_use]
    pub fn rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }

    fn from_map(map: Map<String, Value>) -> Result<Self> {
        let rules = map
            .into_iter()
            .map(|(field, value)| {
                let rule = FieldRule::from_value(&field, value)?;
                Ok((field, rule))
            })
            .collect::<Result<_>>()?;
        Ok(Self { rules })
    }
}

/// One top-level condition of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Every rule set must hold.
    And(Vec<RuleSet>),
    /// At least one rule set must hold.
    Or(Vec<RuleSet>),
    /// Whole-word, case-insensitive search across string fields.
    Text(String),
    /// A rule on a single field.
    Field {
        /// Field name.
        field: String,
        /// The rule applied to it.
        rule: FieldRule,
    },
}

/// A parsed query: clauses applied one after another, each narrowing the
/// records left by the previous one.
///
/// # Examples
///
/// ```
/// use siftlog::query::{FieldRule, Query};
///
/// let parsed: Query = r#"{"age": {"$gt": 21}}"#.parse().unwrap();
/// let built = Query::new().field("age", FieldRule::new().greater_than(21));
/// assert_eq!(parsed, built);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Clauses in query order.
    pub clauses: Vec<Clause>,
}

impl Query {
    /// Creates an empty query, which matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an `$and` clause.
    #[must_use]
    pub fn and(mut self, rule_sets: Vec<RuleSet>) -> Self {
        self.clauses.push(Clause::And(rule_sets));
        self
    }

    /// Appends an `$or` clause.
    #[must_use]
    pub fn or(mut self, rule_sets: Vec<RuleSet>) -> Self {
        self.clauses.push(Clause::Or(rule_sets));
        self
    }

    /// Appends a `$text` clause.
    #[must_use]
    pub fn text(mut self, phrase: impl Into<String>) -> Self {
        self.clauses.push(Clause::Text(phrase.into()));
        self
    }

    /// Appends a field rule.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.clauses.push(Clause::Field {
            field: field.into(),
            rule,
        });
        self
    }

    /// Parses a query from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the value is not an object, a
    /// combinator operand is not an array of objects, `$text` is not a
    /// string, or a field rule is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidQuery(format!(
                    "query must be an object, got {}",
                    type_name(&other)
                )));
            }
        };

        let mut clauses = Vec::with_capacity(map.len());
        for (key, value) in map {
            let clause = match key.as_str() {
                AND_KEY => Clause::And(rule_sets(AND_KEY, value)?),
                OR_KEY => Clause::Or(rule_sets(OR_KEY, value)?),
                TEXT_KEY => match value {
                    Value::String(phrase) => Clause::Text(phrase),
                    other => {
                        return Err(Error::InvalidQuery(format!(
                            "{TEXT_KEY} expects a string, got {}",
                            type_name(&other)
                        )));
                    }
                },
                _ => {
                    let rule = FieldRule::from_value(&key, value)?;
                    Clause::Field { field: key, rule }
                }
            };
            clauses.push(clause);
        }
        Ok(Self { clauses })
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| Error::InvalidQuery(format!("query is not valid JSON: {e}")))?;
        Self::from_value(value)
    }
}

fn rule_sets(key: &str, value: Value) -> Result<Vec<RuleSet>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::InvalidQuery(format!(
                "{key} expects an array, got {}",
                type_name(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => RuleSet::from_map(map),
            other => Err(Error::InvalidQuery(format!(
                "{key}[{index}] must be an object, got {}",
                type_name(&other)
            ))),
        })
        .collect()
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn empty_object_is_empty_query() {
        let query: Query = "{}".parse().unwrap();
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn clauses_keep_key_order() {
        let query: Query = r#"{"name": {"$eq": "Ann"}, "$text": "ann", "$or": [], "age": {}}"#
            .parse()
            .unwrap();

        assert_eq!(
            query,
            Query::new()
                .field("name", FieldRule::new().equals("Ann"))
                .text("ann")
                .or(vec![])
                .field("age", FieldRule::new())
        );
    }

    #[test]
    fn combinators_parse_nested_rule_sets() {
        let query = Query::from_value(json!({
            "$and": [{"age": {"$gt": 10, "$lt": 40}, "name": {"$in": ["Ann", "Bo"]}}],
        }))
        .unwrap();

        let expected = Query::new().and(vec![
            RuleSet::new()
                .rule("age", FieldRule::new().greater_than(10).less_than(40))
                .rule("name", FieldRule::new().is_in(["Ann", "Bo"])),
        ]);
        assert_eq!(query, expected);
    }

    #[test]
    fn operand_types_are_not_checked() {
        let query = Query::from_value(json!({"age": {"$gt": "old", "$in": 5}})).unwrap();
        let Clause::Field { rule, .. } = &query.clauses[0] else {
            panic!("expected field clause");
        };
        assert_eq!(
            rule.operators,
            vec![Operator::Gt(json!("old")), Operator::In(json!(5))]
        );
    }

    #[test]
    fn unknown_operators_are_dropped() {
        let query = Query::from_value(json!({"age": {"$ne": 3, "$eq": 4}})).unwrap();
        assert_eq!(query, Query::new().field("age", FieldRule::new().equals(4)));
    }

    #[test]
    fn unknown_dollar_key_is_a_field() {
        let query = Query::from_value(json!({"$nor": {}})).unwrap();
        assert_eq!(query, Query::new().field("$nor", FieldRule::new()));
    }

    #[rstest]
    #[case::root_array(json!([]), "query must be an object")]
    #[case::and_object(json!({"$and": {}}), "$and expects an array")]
    #[case::or_string(json!({"$or": "x"}), "$or expects an array")]
    #[case::or_element(json!({"$or": [1]}), "$or[0] must be an object")]
    #[case::text_number(json!({"$text": 3}), "$text expects a string")]
    #[case::field_scalar(json!({"age": 30}), "rule for field 'age' must be an object")]
    #[case::nested_field_scalar(json!({"$and": [{"age": 30}]}), "rule for field 'age'")]
    fn rejects_malformed_queries(#[case] value: Value, #[case] message: &str) {
        let err = Query::from_value(value).unwrap_err();
        assert!(
            err.to_string().contains(message),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn invalid_json_text_is_rejected() {
        let err = "{age:".parse::<Query>().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }
}
