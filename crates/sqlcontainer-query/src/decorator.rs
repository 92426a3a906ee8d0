//! Identifier quoting
//!
//! Every property id the compiler emits is wrapped in a prefix and suffix.
//! The process-wide decorator applies to every `QueryBuilder` that has not
//! been given one explicitly. Callers that replace it are responsible for
//! restoring the previous value.

use std::sync::LazyLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

static CURRENT: LazyLock<RwLock<IdentifierDecorator>> =
    LazyLock::new(|| RwLock::new(IdentifierDecorator::default()));

/// Prefix/suffix pair used to quote SQL identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierDecorator {
    prefix: String,
    suffix: String,
}

impl IdentifierDecorator {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// SQL Server style `[id]`
    pub fn brackets() -> Self {
        Self::new("[", "]")
    }

    /// MySQL style `` `id` ``
    pub fn backticks() -> Self {
        Self::new("`", "`")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Wrap `id` in this decorator's prefix and suffix
    pub fn quote(&self, id: &str) -> String {
        let mut quoted = String::with_capacity(self.prefix.len() + id.len() + self.suffix.len());
        quoted.push_str(&self.prefix);
        quoted.push_str(id);
        quoted.push_str(&self.suffix);
        quoted
    }

    /// The process-wide decorator
    pub fn current() -> IdentifierDecorator {
        CURRENT.read().clone()
    }

    /// Replace the process-wide decorator, returning the previous one
    pub fn set_current(decorator: IdentifierDecorator) -> IdentifierDecorator {
        tracing::debug!(
            prefix = %decorator.prefix,
            suffix = %decorator.suffix,
            "replacing identifier decorator"
        );
        std::mem::replace(&mut *CURRENT.write(), decorator)
    }
}

impl Default for IdentifierDecorator {
    /// SQL standard double quotes
    fn default() -> Self {
        Self::new("\"", "\"")
    }
}
