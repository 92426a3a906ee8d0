//! Filter expression tree
//!
//! Filters are immutable values. Leaves name a property (column) and carry
//! the values to bind; composites own their children. The tree is built by
//! the container and handed to the `QueryBuilder` for compilation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlcontainer_core::Value;

/// Comparison operator of a leaf comparison filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl CompareOp {
    /// SQL spelling of the operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
        }
    }
}

/// How a LIKE filter's text becomes a LIKE pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// `text%`
    StartsWith,
    /// `%text`
    EndsWith,
    /// `%text%`
    Contains,
    /// The text already is the pattern, wildcards included
    Pattern,
}

impl MatchMode {
    /// Build the LIKE pattern for `text`
    pub fn apply(&self, text: &str) -> String {
        match self {
            MatchMode::StartsWith => format!("{}%", text),
            MatchMode::EndsWith => format!("%{}", text),
            MatchMode::Contains => format!("%{}%", text),
            MatchMode::Pattern => text.to_string(),
        }
    }
}

/// A filter the compiler has no built-in rule for.
///
/// Rendering is delegated to a `FilterTranslator` registered on the
/// `QueryBuilder`; `as_any` lets the translator downcast to its own type.
pub trait CustomFilter: fmt::Debug + Send + Sync {
    /// Short name used in error messages
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// One node of a filter expression tree
#[derive(Debug, Clone)]
pub enum Filter {
    /// `property OP ?`
    Compare {
        property_id: String,
        op: CompareOp,
        value: Value,
    },
    /// `property BETWEEN ? AND ?`
    Between {
        property_id: String,
        start: Value,
        end: Value,
    },
    /// `property IS NULL`
    IsNull { property_id: String },
    /// `property LIKE ?`, optionally upper-casing both sides
    Like {
        property_id: String,
        text: String,
        mode: MatchMode,
        case_sensitive: bool,
    },
    /// A bare substring matched either as a prefix or anywhere in the value
    SimpleString {
        property_id: String,
        text: String,
        ignore_case: bool,
        only_match_prefix: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Custom(Arc<dyn CustomFilter>),
}

impl Filter {
    pub fn compare(property_id: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Filter::Compare {
            property_id: property_id.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equal(property_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property_id, CompareOp::Equal, value)
    }

    pub fn greater(property_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property_id, CompareOp::Greater, value)
    }

    pub fn greater_or_equal(property_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property_id, CompareOp::GreaterOrEqual, value)
    }

    pub fn less(property_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property_id, CompareOp::Less, value)
    }

    pub fn less_or_equal(property_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property_id, CompareOp::LessOrEqual, value)
    }

    pub fn between(
        property_id: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Filter::Between {
            property_id: property_id.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_null(property_id: impl Into<String>) -> Self {
        Filter::IsNull {
            property_id: property_id.into(),
        }
    }

    /// Case-sensitive LIKE with a caller-supplied pattern
    pub fn like(property_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Like {
            property_id: property_id.into(),
            text: pattern.into(),
            mode: MatchMode::Pattern,
            case_sensitive: true,
        }
    }

    /// Case-insensitive LIKE with a caller-supplied pattern
    pub fn like_case_insensitive(property_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Like {
            property_id: property_id.into(),
            text: pattern.into(),
            mode: MatchMode::Pattern,
            case_sensitive: false,
        }
    }

    /// LIKE whose pattern is derived from `text` by `mode`
    pub fn like_matching(
        property_id: impl Into<String>,
        text: impl Into<String>,
        mode: MatchMode,
        case_sensitive: bool,
    ) -> Self {
        Filter::Like {
            property_id: property_id.into(),
            text: text.into(),
            mode,
            case_sensitive,
        }
    }

    pub fn simple_string(
        property_id: impl Into<String>,
        text: impl Into<String>,
        ignore_case: bool,
        only_match_prefix: bool,
    ) -> Self {
        Filter::SimpleString {
            property_id: property_id.into(),
            text: text.into(),
            ignore_case,
            only_match_prefix,
        }
    }

    pub fn and(children: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(children.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Filter) -> Self {
        Filter::Not(Box::new(operand))
    }

    pub fn custom(filter: impl CustomFilter + 'static) -> Self {
        Filter::Custom(Arc::new(filter))
    }

    /// The property a leaf filter applies to; `None` for composites and
    /// custom filters
    pub fn property_id(&self) -> Option<&str> {
        match self {
            Filter::Compare { property_id, .. }
            | Filter::Between { property_id, .. }
            | Filter::IsNull { property_id }
            | Filter::Like { property_id, .. }
            | Filter::SimpleString { property_id, .. } => Some(property_id),
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) | Filter::Custom(_) => None,
        }
    }

    /// Whether this filter, or any filter below it, references `property_id`
    pub fn applies_to_property(&self, property_id: &str) -> bool {
        match self {
            Filter::And(children) | Filter::Or(children) => children
                .iter()
                .any(|child| child.applies_to_property(property_id)),
            Filter::Not(operand) => operand.applies_to_property(property_id),
            Filter::Custom(_) => false,
            leaf => leaf.property_id() == Some(property_id),
        }
    }
}
