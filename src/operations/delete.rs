//! Delete-item operation. Unconditional; the key must be fully specified.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnConsumedCapacity};

use crate::errors::{Result, map_sdk_error};
use crate::value::{Item, item_to_attribute_values};

/// Prepared delete-item request.
#[derive(Debug)]
pub struct PreparedDelete {
    pub table: String,
    pub key: HashMap<String, AttributeValue>,
}

/// Build a delete request.
pub fn prepare_delete(table: &str, key: &Item) -> Result<PreparedDelete> {
    Ok(PreparedDelete {
        table: table.to_string(),
        key: item_to_attribute_values(key)?,
    })
}

/// Execute the delete round trip.
pub async fn execute_delete(client: &Client, prepared: PreparedDelete) -> Result<()> {
    tracing::debug!(table = %prepared.table, "delete_item");

    client
        .delete_item()
        .table_name(&prepared.table)
        .set_key(Some(prepared.key))
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await
        .map_err(|e| map_sdk_error(e, Some(&prepared.table)))?;
    Ok(())
}
