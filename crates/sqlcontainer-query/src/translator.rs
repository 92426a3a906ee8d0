//! Extension point for filters without a built-in compilation rule

use sqlcontainer_core::Result;

use crate::decorator::IdentifierDecorator;
use crate::filter::CustomFilter;
use crate::statement::StatementHelper;

/// Renders custom filters to a WHERE fragment
///
/// Translators are consulted in registration order; the first one whose
/// `translates` returns true renders the filter.
pub trait FilterTranslator: Send + Sync {
    fn translates(&self, filter: &dyn CustomFilter) -> bool;

    /// Emit the fragment for `filter`, appending one parameter to `sh` per
    /// `?` placeholder, in placeholder order.
    fn where_string(
        &self,
        filter: &dyn CustomFilter,
        sh: &mut StatementHelper,
        decorator: &IdentifierDecorator,
    ) -> Result<String>;
}
