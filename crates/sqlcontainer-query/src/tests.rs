//! Tests for filter compilation

use std::any::Any;

use pretty_assertions::assert_eq;
use sqlcontainer_core::{Result, SqlContainerError, Value};

use super::*;

/// Builder pinned to double quotes so these tests never observe the
/// process-wide decorator.
fn builder() -> QueryBuilder {
    QueryBuilder::new().with_decorator(IdentifierDecorator::default())
}

fn fragment(filter: &Filter) -> (String, Vec<Value>) {
    let mut sh = StatementHelper::new();
    let sql = builder()
        .where_string_for_filter(filter, &mut sh)
        .expect("filter should compile");
    (sql, sh.parameters().to_vec())
}

// =============================================================================
// Leaf filters
// =============================================================================

#[test]
fn test_compare_operators() {
    let cases = [
        (Filter::equal("NAME", "Fido"), "\"NAME\" = ?"),
        (Filter::greater("AGE", 18), "\"AGE\" > ?"),
        (Filter::greater_or_equal("AGE", 18), "\"AGE\" >= ?"),
        (Filter::less("AGE", 18), "\"AGE\" < ?"),
        (Filter::less_or_equal("AGE", 18), "\"AGE\" <= ?"),
    ];

    for (filter, expected) in cases {
        let (sql, params) = fragment(&filter);
        assert_eq!(sql, expected);
        assert_eq!(params.len(), 1);
        assert_eq!(sql.matches('?').count(), 1);
    }
}

#[test]
fn test_equal_binds_value() {
    let (sql, params) = fragment(&Filter::equal("NAME", "Fido"));
    assert_eq!(sql, "\"NAME\" = ?");
    assert_eq!(params, vec![Value::from("Fido")]);
}

#[test]
fn test_between_binds_start_then_end() {
    let (sql, params) = fragment(&Filter::between("AGE", 18, 65));
    assert_eq!(sql, "\"AGE\" BETWEEN ? AND ?");
    assert_eq!(params, vec![Value::Int32(18), Value::Int32(65)]);
}

#[test]
fn test_is_null_binds_nothing() {
    let (sql, params) = fragment(&Filter::is_null("NAME"));
    assert_eq!(sql, "\"NAME\" IS NULL");
    assert!(params.is_empty());
}

#[test]
fn test_like_case_sensitive_keeps_pattern() {
    let (sql, params) = fragment(&Filter::like("NAME", "%lle"));
    assert_eq!(sql, "\"NAME\" LIKE ?");
    assert_eq!(params, vec![Value::from("%lle")]);
}

#[test]
fn test_like_case_insensitive_uppercases_both_sides() {
    let (sql, params) = fragment(&Filter::like_case_insensitive("NAME", "%lle"));
    assert_eq!(sql, "UPPER(\"NAME\") LIKE ?");
    assert_eq!(params, vec![Value::from("%LLE")]);
}

#[test]
fn test_like_matching_modes() {
    let cases = [
        (MatchMode::StartsWith, "Vi%"),
        (MatchMode::EndsWith, "%Vi"),
        (MatchMode::Contains, "%Vi%"),
        (MatchMode::Pattern, "Vi"),
    ];
    for (mode, expected) in cases {
        let (_, params) = fragment(&Filter::like_matching("NAME", "Vi", mode, true));
        assert_eq!(params, vec![Value::from(expected)]);
    }
}

#[test]
fn test_simple_string_prefix() {
    let (sql, params) = fragment(&Filter::simple_string("NAME", "Vi", false, true));
    assert_eq!(sql, "\"NAME\" LIKE ?");
    assert_eq!(params, vec![Value::from("Vi%")]);
}

#[test]
fn test_simple_string_contains_ignore_case() {
    let (sql, params) = fragment(&Filter::simple_string("NAME", "lle", true, false));
    assert_eq!(sql, "UPPER(\"NAME\") LIKE ?");
    assert_eq!(params, vec![Value::from("%LLE%")]);
}

// =============================================================================
// Composite filters
// =============================================================================

#[test]
fn test_and_parenthesizes() {
    let (sql, params) = fragment(&Filter::and([
        Filter::like("NAME", "%lle"),
        Filter::greater("AGE", 18),
    ]));
    assert_eq!(sql, "(\"NAME\" LIKE ? AND \"AGE\" > ?)");
    assert_eq!(params, vec![Value::from("%lle"), Value::Int32(18)]);
}

#[test]
fn test_nested_composites_mirror_tree() {
    let filter = Filter::or([
        Filter::and([Filter::equal("A", 1), Filter::equal("B", 2)]),
        Filter::and([
            Filter::equal("C", 3),
            Filter::or([Filter::equal("D", 4), Filter::is_null("E")]),
        ]),
    ]);
    let (sql, params) = fragment(&filter);
    assert_eq!(
        sql,
        "((\"A\" = ? AND \"B\" = ?) OR (\"C\" = ? AND (\"D\" = ? OR \"E\" IS NULL)))"
    );
    assert_eq!(
        params,
        vec![
            Value::Int32(1),
            Value::Int32(2),
            Value::Int32(3),
            Value::Int32(4)
        ]
    );
}

#[test]
fn test_single_child_composite_is_tolerated() {
    let (sql, params) = fragment(&Filter::and([Filter::equal("AGE", 18)]));
    assert_eq!(sql, "(\"AGE\" = ?)");
    assert_eq!(params.len(), 1);
}

#[test]
fn test_not_leaf_has_no_extra_parentheses() {
    let (sql, params) = fragment(&Filter::not(Filter::equal("AGE", 18)));
    assert_eq!(sql, "NOT \"AGE\" = ?");
    assert_eq!(params, vec![Value::Int32(18)]);
}

#[test]
fn test_not_is_null_rewrites_to_is_not_null() {
    let (sql, params) = fragment(&Filter::not(Filter::is_null("NAME")));
    assert_eq!(sql, "\"NAME\" IS NOT NULL");
    assert!(params.is_empty());
}

#[test]
fn test_double_not_only_rewrites_innermost() {
    let (sql, _) = fragment(&Filter::not(Filter::not(Filter::is_null("NAME"))));
    assert_eq!(sql, "NOT \"NAME\" IS NOT NULL");
}

// =============================================================================
// Top-level clause
// =============================================================================

#[test]
fn test_empty_filter_list_compiles_to_empty_text() {
    let (clause, params) = builder().compile(&[]).unwrap();
    assert_eq!(clause, "");
    assert!(params.is_empty());
}

#[test]
fn test_top_level_list_is_anded_without_group() {
    let (clause, params) = builder()
        .compile(&[Filter::like("NAME", "%lle"), Filter::greater("AGE", 18)])
        .unwrap();
    assert_eq!(clause, " WHERE \"NAME\" LIKE ? AND \"AGE\" > ?");
    assert_eq!(params, vec![Value::from("%lle"), Value::Int32(18)]);
}

#[test]
fn test_top_level_or() {
    let (clause, params) = builder()
        .compile(&[Filter::or([
            Filter::like("NAME", "%lle"),
            Filter::greater("AGE", 18),
        ])])
        .unwrap();
    assert_eq!(clause, " WHERE (\"NAME\" LIKE ? OR \"AGE\" > ?)");
    assert_eq!(params, vec![Value::from("%lle"), Value::Int32(18)]);
}

#[test]
fn test_top_level_not_or() {
    let (clause, params) = builder()
        .compile(&[Filter::not(Filter::or([
            Filter::equal("AGE", 65),
            Filter::equal("AGE", 18),
        ]))])
        .unwrap();
    assert_eq!(clause, " WHERE NOT (\"AGE\" = ? OR \"AGE\" = ?)");
    assert_eq!(params, vec![Value::Int32(65), Value::Int32(18)]);
}

#[test]
fn test_top_level_not_is_null() {
    let (clause, params) = builder()
        .compile(&[Filter::not(Filter::is_null("NAME"))])
        .unwrap();
    assert_eq!(clause, " WHERE \"NAME\" IS NOT NULL");
    assert!(params.is_empty());
}

#[test]
fn test_explicit_decorator_changes_only_identifiers() {
    let brackets = QueryBuilder::new().with_decorator(IdentifierDecorator::brackets());
    let (clause, params) = brackets
        .compile(&[Filter::equal("NAME", "Fido"), Filter::between("AGE", 18, 65)])
        .unwrap();
    assert_eq!(clause, " WHERE [NAME] = ? AND [AGE] BETWEEN ? AND ?");
    assert_eq!(
        params,
        vec![Value::from("Fido"), Value::Int32(18), Value::Int32(65)]
    );
}

#[test]
fn test_accumulator_is_shared_across_calls() {
    let b = builder();
    let mut sh = StatementHelper::new();
    b.where_string_for_filter(&Filter::equal("A", 1), &mut sh)
        .unwrap();
    b.where_string_for_filters(&[Filter::between("B", 2, 3)], &mut sh)
        .unwrap();
    assert_eq!(
        sh.parameters(),
        &[Value::Int32(1), Value::Int32(2), Value::Int32(3)]
    );
}

// =============================================================================
// Failure cases
// =============================================================================

#[derive(Debug)]
struct Soundex {
    column: String,
    word: String,
}

impl CustomFilter for Soundex {
    fn name(&self) -> &str {
        "Soundex"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct SoundexTranslator;

impl FilterTranslator for SoundexTranslator {
    fn translates(&self, filter: &dyn CustomFilter) -> bool {
        filter.as_any().is::<Soundex>()
    }

    fn where_string(
        &self,
        filter: &dyn CustomFilter,
        sh: &mut StatementHelper,
        decorator: &IdentifierDecorator,
    ) -> Result<String> {
        let soundex = filter
            .as_any()
            .downcast_ref::<Soundex>()
            .ok_or_else(|| SqlContainerError::UnsupportedFilter(filter.name().to_string()))?;
        sh.add_parameter(soundex.word.as_str());
        Ok(format!(
            "SOUNDEX({}) = SOUNDEX(?)",
            decorator.quote(&soundex.column)
        ))
    }
}

fn soundex() -> Filter {
    Filter::custom(Soundex {
        column: "NAME".into(),
        word: "Ville".into(),
    })
}

#[test]
fn test_custom_filter_without_translator_fails() {
    let err = builder().compile(&[soundex()]).unwrap_err();
    assert!(matches!(err, SqlContainerError::UnsupportedFilter(_)));
    assert!(err.to_string().contains("Soundex"));
}

#[test]
fn test_custom_filter_with_translator() {
    let b = builder().with_translator(SoundexTranslator);
    let (clause, params) = b
        .compile(&[Filter::and([soundex(), Filter::greater("AGE", 18)])])
        .unwrap();
    assert_eq!(
        clause,
        " WHERE (SOUNDEX(\"NAME\") = SOUNDEX(?) AND \"AGE\" > ?)"
    );
    assert_eq!(params, vec![Value::from("Ville"), Value::Int32(18)]);
}

#[test]
fn test_empty_composite_fails_fast() {
    let err = builder().compile(&[Filter::Or(Vec::new())]).unwrap_err();
    assert!(matches!(err, SqlContainerError::UnsupportedFilter(_)));
}

#[test]
fn test_empty_property_id_fails_fast() {
    let err = builder()
        .compile(&[Filter::not(Filter::is_null(""))])
        .unwrap_err();
    assert!(matches!(err, SqlContainerError::UnsupportedFilter(_)));
}

#[test]
fn test_applies_to_property() {
    let filter = Filter::and([
        Filter::equal("AGE", 18),
        Filter::not(Filter::is_null("NAME")),
    ]);
    assert!(filter.applies_to_property("NAME"));
    assert!(!filter.applies_to_property("ID"));
}

// =============================================================================
// ORDER BY and statement generation
// =============================================================================

#[test]
fn test_order_by_clause() {
    let b = builder();
    assert_eq!(b.order_by_clause(&[]), "");
    assert_eq!(
        b.order_by_clause(&[OrderBy::asc("NAME"), OrderBy::desc("AGE")]),
        " ORDER BY \"NAME\" ASC, \"AGE\" DESC"
    );
}

#[test]
fn test_select_query_with_everything() {
    let query = SelectQuery::new("people")
        .with_filters(vec![Filter::greater("AGE", 18)])
        .with_order_by(vec![OrderBy::asc("ID")])
        .with_page(20, 10);
    let sh = query.generate(&builder()).unwrap();
    assert_eq!(
        sh.query_string(),
        "SELECT * FROM people WHERE \"AGE\" > ? ORDER BY \"ID\" ASC LIMIT 10 OFFSET 20"
    );
    assert_eq!(sh.parameters(), &[Value::Int32(18)]);
    assert_eq!(sh.placeholder_count(), sh.parameter_count());
}

#[test]
fn test_select_query_without_filters() {
    let sh = SelectQuery::new("people").generate(&builder()).unwrap();
    assert_eq!(sh.query_string(), "SELECT * FROM people");
    assert_eq!(sh.parameter_count(), 0);
}

#[test]
fn test_count_query_ignores_paging() {
    let query = SelectQuery::new("people")
        .with_filters(vec![Filter::like("NAME", "%lle")])
        .with_order_by(vec![OrderBy::asc("ID")])
        .with_page(0, 10);
    let sh = query.count(&builder()).unwrap();
    assert_eq!(
        sh.query_string(),
        "SELECT COUNT(*) FROM people WHERE \"NAME\" LIKE ?"
    );
    assert_eq!(sh.parameters(), &[Value::from("%lle")]);
}

#[test]
fn test_select_query_requires_table() {
    let err = SelectQuery::new("  ").generate(&builder()).unwrap_err();
    assert!(matches!(err, SqlContainerError::Query(_)));
}
