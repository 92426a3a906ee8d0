//! SELECT and COUNT statement generation for a table-backed container

use sqlcontainer_core::{Result, SqlContainerError};

use crate::builder::QueryBuilder;
use crate::filter::Filter;
use crate::order_by::OrderBy;
use crate::statement::StatementHelper;

/// A paged, filtered, sorted read of one table
///
/// The table name is emitted verbatim; callers pass it already quoted if
/// their dialect needs that.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    table: String,
    filters: Vec<Filter>,
    order_bys: Vec<OrderBy>,
    offset: usize,
    limit: Option<usize>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_order_by(mut self, order_bys: Vec<OrderBy>) -> Self {
        self.order_bys = order_bys;
        self
    }

    /// Return at most `limit` rows starting at row `offset`
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// `SELECT * FROM t [WHERE ..] [ORDER BY ..] [LIMIT n OFFSET m]`
    pub fn generate(&self, builder: &QueryBuilder) -> Result<StatementHelper> {
        self.ensure_table()?;
        let mut sh = StatementHelper::new();
        let mut sql = format!("SELECT * FROM {}", self.table);
        sql.push_str(&builder.where_string_for_filters(&self.filters, &mut sh)?);
        sql.push_str(&builder.order_by_clause(&self.order_bys));
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, self.offset));
        }
        tracing::trace!(sql = %sql, params = sh.parameter_count(), "generated select");
        sh.set_query_string(sql);
        Ok(sh)
    }

    /// `SELECT COUNT(*) FROM t [WHERE ..]`; paging and ordering are ignored
    pub fn count(&self, builder: &QueryBuilder) -> Result<StatementHelper> {
        self.ensure_table()?;
        let mut sh = StatementHelper::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        sql.push_str(&builder.where_string_for_filters(&self.filters, &mut sh)?);
        sh.set_query_string(sql);
        Ok(sh)
    }

    fn ensure_table(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(SqlContainerError::Query(
                "table name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
