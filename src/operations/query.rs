//! Query operation: range reads within one partition.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnConsumedCapacity};
use serde_json::Value;

use crate::errors::{Result, map_sdk_error};
use crate::expressions::{NameMap, SortClause, ValueMap, build_key_condition};
use crate::results::{ConsumedCapacity, Cursor, QueryResult};
use crate::schema::KeySchema;

/// Optional query parameters. Absent fields are omitted from the wire
/// request entirely.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Page size bound.
    pub limit: Option<i32>,
    /// Continuation cursor from a prior page, passed back unmodified.
    pub cursor: Option<Cursor>,
    /// Attribute projection.
    pub attributes: Option<Vec<String>>,
    /// `false` reverses natural key order ("most recent first" feeds over
    /// monotonically increasing sort keys). Omitted means the store's
    /// forward default.
    pub scan_forward: Option<bool>,
}

/// Prepared query request.
#[derive(Debug)]
pub struct PreparedQuery {
    pub table: String,
    pub index: Option<String>,
    pub key_condition: String,
    pub names: Option<HashMap<String, String>>,
    pub values: Option<HashMap<String, AttributeValue>>,
    pub projection: Option<String>,
    pub limit: Option<i32>,
    pub exclusive_start_key: Option<Cursor>,
    pub scan_forward: Option<bool>,
}

/// Build a query request: partition equality plus optional sort clauses,
/// sharing one name map across the key condition and the projection.
pub fn prepare_query(
    table: &str,
    index: Option<&str>,
    schema: &KeySchema,
    partition: &Value,
    sort_clauses: &[SortClause],
    options: QueryOptions,
) -> Result<PreparedQuery> {
    let mut names = NameMap::new();
    let mut values = ValueMap::new();

    let key_condition = build_key_condition(
        &mut names,
        &mut values,
        (&schema.partition, partition),
        schema.sort.as_deref(),
        sort_clauses,
    )?;

    let projection = options
        .attributes
        .as_deref()
        .map(|attributes| names.projection(attributes));

    Ok(PreparedQuery {
        table: table.to_string(),
        index: index.map(str::to_string),
        key_condition,
        names: names.into_names(),
        values: values.into_values(),
        projection,
        limit: options.limit,
        exclusive_start_key: options.cursor,
        scan_forward: options.scan_forward,
    })
}

/// Execute one query page. The returned cursor, when present, is the
/// store's pagination key unmodified; pass it back to fetch the next page.
pub async fn execute_query(client: &Client, prepared: PreparedQuery) -> Result<QueryResult> {
    tracing::debug!(
        table = %prepared.table,
        index = prepared.index.as_deref().unwrap_or("-"),
        key_condition = %prepared.key_condition,
        "query"
    );

    let result = client
        .query()
        .table_name(&prepared.table)
        .set_index_name(prepared.index)
        .key_condition_expression(prepared.key_condition)
        .set_expression_attribute_names(prepared.names)
        .set_expression_attribute_values(prepared.values)
        .set_projection_expression(prepared.projection)
        .set_limit(prepared.limit)
        .set_exclusive_start_key(prepared.exclusive_start_key)
        .set_scan_index_forward(prepared.scan_forward)
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(output) => {
            let consumed_capacity = output
                .consumed_capacity()
                .map(ConsumedCapacity::from_sdk);
            QueryResult::decode(
                output.items.unwrap_or_default(),
                output.count,
                output.scanned_count,
                output.last_evaluated_key,
                consumed_capacity,
            )
        }
        Err(e) => Err(map_sdk_error(e, Some(&prepared.table))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::expressions::Operator;

    fn logs_schema() -> KeySchema {
        KeySchema {
            partition: "user".to_string(),
            sort: Some("tag".to_string()),
        }
    }

    #[test]
    fn partition_only_query() {
        let prepared = prepare_query(
            "logs",
            None,
            &logs_schema(),
            &json!("sub-1"),
            &[],
            QueryOptions::default(),
        )
        .unwrap();

        assert_eq!(prepared.key_condition, "#attr_user = :val_user");
        assert_eq!(prepared.names.unwrap()["#attr_user"], "user");
        assert!(prepared.projection.is_none());
        assert!(prepared.limit.is_none());
    }

    #[test]
    fn prefix_query_with_limit_and_reverse_order() {
        let prepared = prepare_query(
            "logs",
            None,
            &logs_schema(),
            &json!("sub-1"),
            &[SortClause::new(Operator::BeginsWith, "REWARD::")],
            QueryOptions {
                limit: Some(1),
                scan_forward: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            prepared.key_condition,
            "#attr_user = :val_user AND begins_with(#attr_tag, :val_tag)"
        );
        assert_eq!(prepared.limit, Some(1));
        assert_eq!(prepared.scan_forward, Some(false));
        let values = prepared.values.unwrap();
        assert_eq!(values[":val_tag"], AttributeValue::S("REWARD::".to_string()));
    }

    #[test]
    fn projection_shares_the_request_name_map() {
        let prepared = prepare_query(
            "logs",
            Some("ByTimestamp"),
            &KeySchema {
                partition: "user".to_string(),
                sort: Some("timestamp".to_string()),
            },
            &json!("sub-1"),
            &[SortClause::new(Operator::GreaterThan, 0)],
            QueryOptions {
                attributes: Some(vec!["user".to_string(), "log".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(prepared.index.as_deref(), Some("ByTimestamp"));
        assert_eq!(prepared.projection.as_deref(), Some("#attr_user, log"));
        // `user` appears in both the key condition and the projection but
        // maps to a single wire entry.
        let names = prepared.names.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names["#attr_user"], "user");
        assert_eq!(names["#attr_timestamp"], "timestamp");
    }

    #[test]
    fn between_validation_happens_at_prepare_time() {
        let clause = SortClause {
            operator: Operator::Between,
            value: json!(0),
            second: None,
        };
        let err = prepare_query(
            "rewards",
            None,
            &KeySchema {
                partition: "category".to_string(),
                sort: Some("release-id".to_string()),
            },
            &json!("AVATAR"),
            &[clause],
            QueryOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::errors::Error::Validation(_)));
    }
}
