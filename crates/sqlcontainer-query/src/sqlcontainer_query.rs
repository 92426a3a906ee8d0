//! SQLContainer Query - filter compilation
//!
//! Translates the container's filter tree into a parameterized WHERE
//! fragment, and builds the SELECT and COUNT statements around it.
//!
//! # Example
//!
//! ```
//! use sqlcontainer_query::{Filter, QueryBuilder, IdentifierDecorator};
//! use sqlcontainer_core::Value;
//!
//! let builder = QueryBuilder::new().with_decorator(IdentifierDecorator::default());
//! let filters = vec![Filter::like("NAME", "%lle"), Filter::greater("AGE", 18)];
//! let (clause, params) = builder.compile(&filters).unwrap();
//!
//! assert_eq!(clause, " WHERE \"NAME\" LIKE ? AND \"AGE\" > ?");
//! assert_eq!(params, vec![Value::from("%lle"), Value::from(18)]);
//! ```

mod builder;
mod decorator;
mod filter;
mod generator;
mod order_by;
mod statement;
mod translator;

#[cfg(test)]
mod tests;

pub use builder::QueryBuilder;
pub use decorator::IdentifierDecorator;
pub use filter::{CompareOp, CustomFilter, Filter, MatchMode};
pub use generator::SelectQuery;
pub use order_by::OrderBy;
pub use statement::StatementHelper;
pub use translator::FilterTranslator;
