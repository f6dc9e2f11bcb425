//! Get-item operation.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnConsumedCapacity};

use crate::errors::{Result, map_sdk_error};
use crate::expressions::NameMap;
use crate::results::{ConsumedCapacity, GetResult};
use crate::value::{Item, attribute_values_to_item, item_to_attribute_values};

/// Prepared get-item request.
#[derive(Debug)]
pub struct PreparedGet {
    pub table: String,
    pub key: HashMap<String, AttributeValue>,
    pub projection: Option<String>,
    pub names: Option<HashMap<String, String>>,
}

/// Build a get-item request. The key must already be fully assembled by the
/// schema layer.
pub fn prepare_get(
    table: &str,
    key: &Item,
    attributes: Option<&[String]>,
) -> Result<PreparedGet> {
    let wire_key = item_to_attribute_values(key)?;

    let (projection, names) = match attributes {
        Some(attributes) => {
            let mut names = NameMap::new();
            let projection = names.projection(attributes);
            (Some(projection), names.into_names())
        }
        None => (None, None),
    };

    Ok(PreparedGet {
        table: table.to_string(),
        key: wire_key,
        projection,
        names,
    })
}

/// Execute a get-item round trip. Absence of the item is a `None` result,
/// not an error.
pub async fn execute_get(client: &Client, prepared: PreparedGet) -> Result<GetResult> {
    tracing::debug!(table = %prepared.table, "get_item");

    let result = client
        .get_item()
        .table_name(&prepared.table)
        .set_key(Some(prepared.key))
        .set_projection_expression(prepared.projection)
        .set_expression_attribute_names(prepared.names)
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(output) => {
            let consumed_capacity = output
                .consumed_capacity()
                .map(ConsumedCapacity::from_sdk);
            let item = output.item.map(attribute_values_to_item).transpose()?;
            Ok(GetResult {
                item,
                consumed_capacity,
            })
        }
        Err(e) => Err(map_sdk_error(e, Some(&prepared.table))),
    }
}
