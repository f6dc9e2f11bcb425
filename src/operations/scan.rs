//! Scan operation: full iteration of the partition space.
//!
//! Used only where no selective key is available; the pagination contract
//! is identical to query's.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::ReturnConsumedCapacity;

use crate::errors::{Result, map_sdk_error};
use crate::expressions::NameMap;
use crate::results::{ConsumedCapacity, Cursor, QueryResult};

/// Optional scan parameters. Absent fields are omitted from the wire
/// request entirely.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Page size bound.
    pub limit: Option<i32>,
    /// Continuation cursor from a prior page, passed back unmodified.
    pub cursor: Option<Cursor>,
    /// Attribute projection.
    pub attributes: Option<Vec<String>>,
}

/// Prepared scan request.
#[derive(Debug)]
pub struct PreparedScan {
    pub table: String,
    pub index: Option<String>,
    pub projection: Option<String>,
    pub names: Option<HashMap<String, String>>,
    pub limit: Option<i32>,
    pub exclusive_start_key: Option<Cursor>,
}

/// Build a scan request.
pub fn prepare_scan(table: &str, index: Option<&str>, options: ScanOptions) -> PreparedScan {
    let (projection, names) = match options.attributes.as_deref() {
        Some(attributes) => {
            let mut names = NameMap::new();
            let projection = names.projection(attributes);
            (Some(projection), names.into_names())
        }
        None => (None, None),
    };

    PreparedScan {
        table: table.to_string(),
        index: index.map(str::to_string),
        projection,
        names,
        limit: options.limit,
        exclusive_start_key: options.cursor,
    }
}

/// Execute one scan page.
pub async fn execute_scan(client: &Client, prepared: PreparedScan) -> Result<QueryResult> {
    tracing::debug!(
        table = %prepared.table,
        index = prepared.index.as_deref().unwrap_or("-"),
        "scan"
    );

    let result = client
        .scan()
        .table_name(&prepared.table)
        .set_index_name(prepared.index)
        .set_projection_expression(prepared.projection)
        .set_expression_attribute_names(prepared.names)
        .set_limit(prepared.limit)
        .set_exclusive_start_key(prepared.exclusive_start_key)
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
    use super::*;

    #[test]
    fn scan_with_projection_escapes_names() {
        let prepared = prepare_scan(
            "districts",
            None,
            ScanOptions {
                attributes: Some(vec!["name".to_string(), "code".to_string()]),
                limit: Some(50),
                ..Default::default()
            },
        );
        assert_eq!(prepared.projection.as_deref(), Some("#attr_name, code"));
        assert_eq!(prepared.limit, Some(50));
    }

    #[test]
    fn bare_scan_emits_no_optional_fields() {
        let prepared = prepare_scan("districts", None, ScanOptions::default());
        assert!(prepared.projection.is_none());
        assert!(prepared.names.is_none());
        assert!(prepared.limit.is_none());
        assert!(prepared.exclusive_start_key.is_none());
    }
}
