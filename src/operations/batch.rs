//! Batch read/write operations.
//!
//! Each batch is one round trip, bounded by the store's request limits.
//! Requests the store leaves unprocessed come back to the caller decoded
//! and untouched — the engine's no-retry rule applies to batches too, so
//! redriving them is a caller (or infrastructure) decision.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, KeysAndAttributes, PutRequest, ReturnConsumedCapacity,
    WriteRequest,
};

use crate::errors::{Error, Result, map_sdk_error};
use crate::expressions::NameMap;
use crate::value::{Item, attribute_values_to_item, item_to_attribute_values};

/// Maximum keys per batch-get request (store limit).
pub const MAX_BATCH_GET_KEYS: usize = 100;

/// Maximum put/delete requests per batch-write request (store limit).
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// Prepared batch-get request.
#[derive(Debug)]
pub struct PreparedBatchGet {
    pub table: String,
    pub keys: Vec<HashMap<String, AttributeValue>>,
    pub projection: Option<String>,
    pub names: Option<HashMap<String, String>>,
}

/// Result of a batch get. `unprocessed_keys` is whatever the store did not
/// serve this round trip; the caller owns any redrive.
#[derive(Debug, Clone, Default)]
pub struct BatchGetResult {
    pub items: Vec<Item>,
    pub unprocessed_keys: Vec<Item>,
}

/// Build a batch-get request from fully-specified keys.
pub fn prepare_batch_get(
    table: &str,
    keys: &[Item],
    attributes: Option<&[String]>,
) -> Result<PreparedBatchGet> {
    if keys.len() > MAX_BATCH_GET_KEYS {
        return Err(Error::Validation(format!(
            "batch get exceeds the maximum of {MAX_BATCH_GET_KEYS} keys (got {})",
            keys.len()
        )));
    }

    let wire_keys = keys
        .iter()
        .map(item_to_attribute_values)
        .collect::<Result<Vec<_>>>()?;

    let (projection, names) = match attributes {
        Some(attributes) => {
            let mut names = NameMap::new();
            let projection = names.projection(attributes);
            (Some(projection), names.into_names())
        }
        None => (None, None),
    };

    Ok(PreparedBatchGet {
        table: table.to_string(),
        keys: wire_keys,
        projection,
        names,
    })
}

/// Execute one batch-get round trip.
pub async fn execute_batch_get(
    client: &Client,
    prepared: PreparedBatchGet,
) -> Result<BatchGetResult> {
    if prepared.keys.is_empty() {
        return Ok(BatchGetResult::default());
    }

    tracing::debug!(table = %prepared.table, keys = prepared.keys.len(), "batch_get_item");

    let keys_and_attributes = KeysAndAttributes::builder()
        .set_keys(Some(prepared.keys))
        .set_projection_expression(prepared.projection)
        .set_expression_attribute_names(prepared.names)
        .build()
        .map_err(|e| Error::Validation(format!("failed to build batch get request: {e}")))?;

    let result = client
        .batch_get_item()
        .request_items(&prepared.table, keys_and_attributes)
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(output) => {
            let items = output
                .responses
                .unwrap_or_default()
                .remove(&prepared.table)
                .unwrap_or_default()
                .into_iter()
                .map(attribute_values_to_item)
                .collect::<Result<Vec<_>>>()?;

            let unprocessed_keys = output
                .unprocessed_keys
                .unwrap_or_default()
                .remove(&prepared.table)
                .map(|pending| pending.keys)
                .unwrap_or_default()
                .into_iter()
                .map(attribute_values_to_item)
                .collect::<Result<Vec<_>>>()?;

            Ok(BatchGetResult {
                items,
                unprocessed_keys,
            })
        }
        Err(e) => Err(map_sdk_error(e, Some(&prepared.table))),
    }
}

/// Prepared batch-write request.
#[derive(Debug)]
pub struct PreparedBatchWrite {
    pub table: String,
    pub requests: Vec<WriteRequest>,
}

/// Result of a batch write: the requests the store did not process.
#[derive(Debug, Clone, Default)]
pub struct BatchWriteResult {
    pub unprocessed_puts: Vec<Item>,
    pub unprocessed_deletes: Vec<Item>,
}

/// Build a batch-write request from items to put and keys to delete.
pub fn prepare_batch_write(
    table: &str,
    puts: &[Item],
    delete_keys: &[Item],
) -> Result<PreparedBatchWrite> {
    if puts.len() + delete_keys.len() > MAX_BATCH_WRITE_ITEMS {
        return Err(Error::Validation(format!(
            "batch write exceeds the maximum of {MAX_BATCH_WRITE_ITEMS} requests (got {})",
            puts.len() + delete_keys.len()
        )));
    }

    let mut requests = Vec::with_capacity(puts.len() + delete_keys.len());
    for item in puts {
        let put = PutRequest::builder()
            .set_item(Some(item_to_attribute_values(item)?))
            .build()
            .map_err(|e| Error::Validation(format!("failed to build put request: {e}")))?;
        requests.push(WriteRequest::builder().put_request(put).build());
    }
    for key in delete_keys {
        let delete = DeleteRequest::builder()
            .set_key(Some(item_to_attribute_values(key)?))
            .build()
            .map_err(|e| Error::Validation(format!("failed to build delete request: {e}")))?;
        requests.push(WriteRequest::builder().delete_request(delete).build());
    }

    Ok(PreparedBatchWrite {
        table: table.to_string(),
        requests,
    })
}

/// Execute one batch-write round trip.
pub async fn execute_batch_write(
    client: &Client,
    prepared: PreparedBatchWrite,
) -> Result<BatchWriteResult> {
    if prepared.requests.is_empty() {
        return Ok(BatchWriteResult::default());
    }

    tracing::debug!(table = %prepared.table, requests = prepared.requests.len(), "batch_write_item");

    let mut request_items = HashMap::new();
    request_items.insert(prepared.table.clone(), prepared.requests);

    let result = client
        .batch_write_item()
        .set_request_items(Some(request_items))
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(output) => {
            let mut unprocessed = BatchWriteResult::default();
            let pending = output
                .unprocessed_items
                .unwrap_or_default()
                .remove(&prepared.table)
                .unwrap_or_default();
            for request in pending {
                if let Some(put) = request.put_request {
                    unprocessed
                        .unprocessed_puts
                        .push(attribute_values_to_item(put.item)?);
                } else if let Some(delete) = request.delete_request {
                    unprocessed
                        .unprocessed_deletes
                        .push(attribute_values_to_item(delete.key)?);
                }
            }
            Ok(unprocessed)
        }
        Err(e) => Err(map_sdk_error(e, Some(&prepared.table))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_item(value: serde_json::Value) -> Item {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn batch_get_rejects_oversized_requests() {
        let keys: Vec<Item> = (0..MAX_BATCH_GET_KEYS + 1)
            .map(|i| as_item(json!({"user": format!("sub-{i}")})))
            .collect();
        let err = prepare_batch_get("logs", &keys, None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn batch_get_projection_escapes_reserved_names() {
        let keys = vec![as_item(json!({"user": "sub-1", "tag": "REWARD"}))];
        let prepared = prepare_batch_get(
            "logs",
            &keys,
            Some(&["tag".to_string(), "log".to_string()]),
        )
        .unwrap();
        assert_eq!(prepared.projection.as_deref(), Some("#attr_tag, log"));
        assert_eq!(prepared.keys.len(), 1);
    }

    #[test]
    fn batch_write_combines_puts_and_deletes_under_the_limit() {
        let puts = vec![as_item(json!({"user": "sub-1", "tag": "REWARD::1"}))];
        let deletes = vec![as_item(json!({"user": "sub-2", "tag": "REWARD::2"}))];
        let prepared = prepare_batch_write("logs", &puts, &deletes).unwrap();
        assert_eq!(prepared.requests.len(), 2);
        assert!(prepared.requests[0].put_request.is_some());
        assert!(prepared.requests[1].delete_request.is_some());
    }

    #[test]
    fn batch_write_rejects_oversized_requests() {
        let puts: Vec<Item> = (0..MAX_BATCH_WRITE_ITEMS)
            .map(|i| as_item(json!({"user": format!("sub-{i}")})))
            .collect();
        let deletes = vec![as_item(json!({"user": "one-too-many"}))];
        let err = prepare_batch_write("logs", &puts, &deletes).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
