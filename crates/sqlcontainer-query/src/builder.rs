//! Filter compiler
//!
//! Turns a filter tree into a WHERE fragment with `?` placeholders, pushing
//! the bound values onto a `StatementHelper` as each placeholder is written.

use std::fmt;
use std::sync::Arc;

use sqlcontainer_core::{Result, SqlContainerError, Value};

use crate::decorator::IdentifierDecorator;
use crate::filter::{Filter, MatchMode};
use crate::order_by::OrderBy;
use crate::statement::StatementHelper;
use crate::translator::FilterTranslator;

/// Compiles filters and ORDER BY lists to SQL text
///
/// Without an explicit decorator the builder reads the process-wide one at
/// the start of every compilation.
#[derive(Clone, Default)]
pub struct QueryBuilder {
    decorator: Option<IdentifierDecorator>,
    translators: Vec<Arc<dyn FilterTranslator>>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin identifier quoting for this builder, ignoring the process-wide decorator
    pub fn with_decorator(mut self, decorator: IdentifierDecorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Register a translator for custom filters
    pub fn with_translator(mut self, translator: impl FilterTranslator + 'static) -> Self {
        self.translators.push(Arc::new(translator));
        self
    }

    /// The decorator compilations will use right now
    pub fn decorator(&self) -> IdentifierDecorator {
        self.decorator
            .clone()
            .unwrap_or_else(IdentifierDecorator::current)
    }

    pub fn quote(&self, id: &str) -> String {
        self.decorator().quote(id)
    }

    /// Compile the container's filter set into `(where_clause, parameters)`
    pub fn compile(&self, filters: &[Filter]) -> Result<(String, Vec<Value>)> {
        let mut sh = StatementHelper::new();
        let clause = self.where_string_for_filters(filters, &mut sh)?;
        let (_, parameters) = sh.into_parts();
        Ok((clause, parameters))
    }

    /// ` WHERE a AND b ...` for an implicitly ANDed list, or empty text when
    /// there are no filters
    pub fn where_string_for_filters(
        &self,
        filters: &[Filter],
        sh: &mut StatementHelper,
    ) -> Result<String> {
        if filters.is_empty() {
            return Ok(String::new());
        }
        let decorator = self.decorator();
        let joined = self.joined(filters, " AND ", sh, &decorator)?;
        Ok(format!(" WHERE {}", joined))
    }

    /// The fragment for one filter node, without the WHERE keyword
    pub fn where_string_for_filter(
        &self,
        filter: &Filter,
        sh: &mut StatementHelper,
    ) -> Result<String> {
        self.translate(filter, sh, &self.decorator())
    }

    /// ` ORDER BY "a" ASC, "b" DESC`, or empty text for an empty list
    pub fn order_by_clause(&self, order_bys: &[OrderBy]) -> String {
        if order_bys.is_empty() {
            return String::new();
        }
        let decorator = self.decorator();
        let columns: Vec<String> = order_bys
            .iter()
            .map(|ob| format!("{} {}", decorator.quote(ob.column()), ob.direction_sql()))
            .collect();
        format!(" ORDER BY {}", columns.join(", "))
    }

    fn joined(
        &self,
        filters: &[Filter],
        glue: &str,
        sh: &mut StatementHelper,
        decorator: &IdentifierDecorator,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(filters.len());
        for filter in filters {
            parts.push(self.translate(filter, sh, decorator)?);
        }
        Ok(parts.join(glue))
    }

    fn translate(
        &self,
        filter: &Filter,
        sh: &mut StatementHelper,
        decorator: &IdentifierDecorator,
    ) -> Result<String> {
        if filter.property_id().is_some_and(str::is_empty) {
            return Err(SqlContainerError::UnsupportedFilter(format!(
                "{} has an empty property id",
                FilterKind(filter)
            )));
        }

        match filter {
            Filter::Compare {
                property_id,
                op,
                value,
            } => {
                sh.add_parameter(value.clone());
                Ok(format!("{} {} ?", decorator.quote(property_id), op.as_sql()))
            }
            Filter::Between {
                property_id,
                start,
                end,
            } => {
                sh.add_parameter(start.clone());
                sh.add_parameter(end.clone());
                Ok(format!("{} BETWEEN ? AND ?", decorator.quote(property_id)))
            }
            Filter::IsNull { property_id } => {
                Ok(format!("{} IS NULL", decorator.quote(property_id)))
            }
            Filter::Like {
                property_id,
                text,
                mode,
                case_sensitive,
            } => Ok(like(
                decorator,
                property_id,
                &mode.apply(text),
                *case_sensitive,
                sh,
            )),
            Filter::SimpleString {
                property_id,
                text,
                ignore_case,
                only_match_prefix,
            } => {
                let mode = if *only_match_prefix {
                    MatchMode::StartsWith
                } else {
                    MatchMode::Contains
                };
                Ok(like(
                    decorator,
                    property_id,
                    &mode.apply(text),
                    !*ignore_case,
                    sh,
                ))
            }
            Filter::And(children) => self.group(children, " AND ", filter, sh, decorator),
            Filter::Or(children) => self.group(children, " OR ", filter, sh, decorator),
            Filter::Not(operand) => match operand.as_ref() {
                Filter::IsNull { property_id } if !property_id.is_empty() => {
                    Ok(format!("{} IS NOT NULL", decorator.quote(property_id)))
                }
                other => Ok(format!("NOT {}", self.translate(other, sh, decorator)?)),
            },
            Filter::Custom(custom) => {
                let translator = self
                    .translators
                    .iter()
                    .find(|t| t.translates(custom.as_ref()))
                    .ok_or_else(|| {
                        SqlContainerError::UnsupportedFilter(format!(
                            "no translator registered for custom filter '{}'",
                            custom.name()
                        ))
                    })?;
                translator.where_string(custom.as_ref(), sh, decorator)
            }
        }
    }

    fn group(
        &self,
        children: &[Filter],
        glue: &str,
        filter: &Filter,
        sh: &mut StatementHelper,
        decorator: &IdentifierDecorator,
    ) -> Result<String> {
        if children.is_empty() {
            return Err(SqlContainerError::UnsupportedFilter(format!(
                "{} has no children",
                FilterKind(filter)
            )));
        }
        Ok(format!("({})", self.joined(children, glue, sh, decorator)?))
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("decorator", &self.decorator)
            .field("translators", &self.translators.len())
            .finish()
    }
}

fn like(
    decorator: &IdentifierDecorator,
    property_id: &str,
    pattern: &str,
    case_sensitive: bool,
    sh: &mut StatementHelper,
) -> String {
    if case_sensitive {
        sh.add_parameter(pattern);
        format!("{} LIKE ?", decorator.quote(property_id))
    } else {
        sh.add_parameter(pattern.to_uppercase());
        format!("UPPER({}) LIKE ?", decorator.quote(property_id))
    }
}

/// Short node description for error messages
struct FilterKind<'a>(&'a Filter);

impl fmt::Display for FilterKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Filter::Compare { op, .. } => write!(f, "Compare({:?})", op),
            Filter::Between { .. } => write!(f, "Between"),
            Filter::IsNull { .. } => write!(f, "IsNull"),
            Filter::Like { .. } => write!(f, "Like"),
            Filter::SimpleString { .. } => write!(f, "SimpleString"),
            Filter::And(_) => write!(f, "And"),
            Filter::Or(_) => write!(f, "Or"),
            Filter::Not(_) => write!(f, "Not"),
            Filter::Custom(custom) => write!(f, "Custom({})", custom.name()),
        }
    }
}
