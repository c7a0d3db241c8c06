//! Siftlog - an embedded query engine over tagged JSON record logs.
//!
//! The engine reads every record of a log (see [`siftlog_log`]), filters them
//! with a MongoDB-style query, then sorts and projects the survivors.
//!
//! | Query key | Meaning |
//! |---|---|
//! | `$and` | array of rule sets, all must hold |
//! | `$or` | array of rule sets, one must hold |
//! | `$text` | whole-word, case-insensitive phrase search over string fields |
//! | anything else | field name, mapped to a rule of `$eq` / `$gt` / `$lt` / `$in` |

#![forbid(unsafe_code)]

pub mod combinators;
pub mod config;
pub mod engine;
pub mod error;
pub mod predicate;
pub mod query;
pub mod shape;
pub mod text;
pub mod value;

// Public CLI module (needed by binary)
pub mod cli;

pub use config::Config;
pub use engine::Engine;
pub use error::{Error, Result};
pub use query::{Clause, FieldRule, Operator, Query, RuleSet};
pub use shape::{EndRule, SortDirection};
pub use siftlog_log::Record;
pub use text::{TextMatcher, TextScope};
