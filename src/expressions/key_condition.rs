//! Key-condition expression building.
//!
//! The root of every key condition is partition equality; zero or more sort
//! clauses AND onto it. OR is not representable, matching the store's key
//! condition grammar.

use serde_json::Value;

use super::names::NameMap;
use super::values::{ValueMap, ValueRole};
use crate::errors::{Error, Result};

/// Sort-key comparison operators supported by the store's key condition
/// grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    BeginsWith,
    LessThan,
    GreaterThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
}

/// One sort-key clause of a query.
#[derive(Debug, Clone)]
pub struct SortClause {
    pub operator: Operator,
    pub value: Value,
    /// Second bound; only meaningful (and required) for `Between`.
    pub second: Option<Value>,
}

impl SortClause {
    /// A single-bound clause.
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            operator,
            value: value.into(),
            second: None,
        }
    }

    /// An inclusive `BETWEEN low AND high` clause.
    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            operator: Operator::Between,
            value: low.into(),
            second: Some(high.into()),
        }
    }
}

/// Compose partition equality plus sort clauses into one expression.
///
/// Validation happens here, before any network call: `Between` without its
/// second bound fails, as does any sort clause against a schema with no
/// sort key.
pub fn build_key_condition(
    names: &mut NameMap,
    values: &mut ValueMap,
    partition: (&str, &Value),
    sort_attr: Option<&str>,
    sort_clauses: &[SortClause],
) -> Result<String> {
    let (partition_attr, partition_value) = partition;
    let name = names.escape_path(partition_attr);
    let placeholder = values.bind(partition_attr, partition_value, ValueRole::Update)?;
    let mut expression = format!("{name} = {placeholder}");

    if !sort_clauses.is_empty() {
        let sort_attr = sort_attr.ok_or_else(|| {
            Error::Validation(
                "sort clauses were given but the schema does not declare a sort key".into(),
            )
        })?;
        for clause in sort_clauses {
            let rendered = render_sort_clause(names, values, sort_attr, clause)?;
            expression.push_str(" AND ");
            expression.push_str(&rendered);
        }
    }

    Ok(expression)
}

fn render_sort_clause(
    names: &mut NameMap,
    values: &mut ValueMap,
    sort_attr: &str,
    clause: &SortClause,
) -> Result<String> {
    let name = names.escape_path(sort_attr);
    let first = values.bind(sort_attr, &clause.value, ValueRole::Update)?;

    if clause.operator != Operator::Between && clause.second.is_some() {
        return Err(Error::Validation(
            "a second bound is only valid for BETWEEN".into(),
        ));
    }

    Ok(match clause.operator {
        Operator::Eq => format!("{name} = {first}"),
        Operator::BeginsWith => format!("begins_with({name}, {first})"),
        Operator::LessThan => format!("{name} < {first}"),
        Operator::GreaterThan => format!("{name} > {first}"),
        Operator::GreaterThanOrEqual => format!("{name} >= {first}"),
        Operator::LessThanOrEqual => format!("{name} <= {first}"),
        Operator::Between => {
            let high = clause.second.as_ref().ok_or_else(|| {
                Error::Validation("BETWEEN requires exactly two bound values".into())
            })?;
            let second = values.bind(sort_attr, high, ValueRole::Update)?;
            format!("{name} BETWEEN {first} AND {second}")
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn build(
        sort_attr: Option<&str>,
        clauses: &[SortClause],
    ) -> Result<(String, Option<std::collections::HashMap<String, String>>)> {
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        let expr = build_key_condition(
            &mut names,
            &mut values,
            ("category", &json!("troop-42")),
            sort_attr,
            clauses,
        )?;
        Ok((expr, names.into_names()))
    }

    #[test]
    fn partition_only() {
        let (expr, names) = build(Some("release-id"), &[]).unwrap();
        assert_eq!(expr, "category = :val_category");
        assert!(names.is_none());
    }

    #[test]
    fn begins_with_clause() {
        let (expr, names) = build(
            Some("tag"),
            &[SortClause::new(Operator::BeginsWith, "earned::")],
        )
        .unwrap();
        assert_eq!(
            expr,
            "category = :val_category AND begins_with(#attr_tag, :val_tag)"
        );
        assert_eq!(names.unwrap()["#attr_tag"], "tag");
    }

    #[test]
    fn between_clause_binds_two_values() {
        let (expr, _) = build(
            Some("release-id"),
            &[SortClause::between(0, 99999)],
        )
        .unwrap();
        assert_eq!(
            expr,
            "category = :val_category AND #attr_release_id BETWEEN \
             :val_release_id AND :val_release_id_2"
        );
    }

    #[test]
    fn between_missing_second_bound_fails_before_any_call() {
        let clause = SortClause {
            operator: Operator::Between,
            value: json!(0),
            second: None,
        };
        let err = build(Some("release-id"), &[clause]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn second_bound_outside_between_fails() {
        let clause = SortClause {
            operator: Operator::LessThan,
            value: json!(10),
            second: Some(json!(20)),
        };
        assert!(build(Some("release-id"), &[clause]).is_err());
    }

    #[test]
    fn multiple_clauses_chain_with_and() {
        let (expr, _) = build(
            Some("tag"),
            &[
                SortClause::new(Operator::BeginsWith, "REWARD::"),
                SortClause::new(Operator::LessThanOrEqual, "REWARD::z"),
            ],
        )
        .unwrap();
        assert_eq!(
            expr,
            "category = :val_category AND begins_with(#attr_tag, :val_tag) \
             AND #attr_tag <= :val_tag_2"
        );
    }

    #[test]
    fn sort_clause_without_sort_key_fails() {
        let err = build(None, &[SortClause::new(Operator::Eq, "x")]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn comparison_operators_render_native_tokens() {
        for (operator, token) in [
            (Operator::LessThan, "<"),
            (Operator::GreaterThan, ">"),
            (Operator::GreaterThanOrEqual, ">="),
            (Operator::LessThanOrEqual, "<="),
            (Operator::Eq, "="),
        ] {
            let (expr, _) = build(Some("release-id"), &[SortClause::new(operator, 7)]).unwrap();
            assert!(
                expr.ends_with(&format!("#attr_release_id {token} :val_release_id")),
                "unexpected rendering for {operator:?}: {expr}"
            );
        }
    }
}
