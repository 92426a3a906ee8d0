//! Sort order for generated SELECT statements

use serde::{Deserialize, Serialize};

/// One ORDER BY column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    column: String,
    ascending: bool,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, ascending: bool) -> Self {
        Self {
            column: column.into(),
            ascending,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, true)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, false)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub(crate) fn direction_sql(&self) -> &'static str {
        if self.ascending { "ASC" } else { "DESC" }
    }
}
