//! Create (conditional put) operation.
//!
//! The key attributes merge into the item body and the whole write executes
//! as a single atomic conditional put. When two callers race the same
//! guarded key, the store guarantees exactly one winner; the loser gets
//! `ConditionalCheckFailed` and must not assume any part of its write
//! applied.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{
    AttributeValue, ReturnConsumedCapacity, ReturnValuesOnConditionCheckFailure,
};

use crate::errors::{Result, map_sdk_error_with_item};
use crate::expressions::{Guard, NameMap, ValueMap};
use crate::value::{Item, item_to_attribute_values};

/// Prepared put-item request.
#[derive(Debug)]
pub struct PreparedPut {
    pub table: String,
    pub item: HashMap<String, AttributeValue>,
    pub condition: Option<String>,
    pub names: Option<HashMap<String, String>>,
    pub values: Option<HashMap<String, AttributeValue>>,
}

/// Build a conditional put: key attributes merged into the item body, guard
/// rendered into a condition expression.
pub fn prepare_put(
    table: &str,
    item: &Item,
    key: &Item,
    guard: Option<&Guard>,
) -> Result<PreparedPut> {
    let mut merged = item.clone();
    for (attr, value) in key {
        merged.insert(attr.clone(), value.clone());
    }

    let mut names = NameMap::new();
    let mut values = ValueMap::new();
    let condition = match guard {
        Some(guard) => guard.build(&mut names, &mut values)?,
        None => None,
    };

    Ok(PreparedPut {
        table: table.to_string(),
        item: item_to_attribute_values(&merged)?,
        condition,
        names: names.into_names(),
        values: values.into_values(),
    })
}

/// Execute the conditional put. A failed guard surfaces as
/// `ConditionalCheckFailed`, carrying the store's current item image when
/// available; no retry is attempted.
pub async fn execute_put(client: &Client, prepared: PreparedPut) -> Result<()> {
    tracing::debug!(
        table = %prepared.table,
        condition = prepared.condition.as_deref().unwrap_or("-"),
        "put_item"
    );

    let result = client
        .put_item()
        .table_name(&prepared.table)
        .set_item(Some(prepared.item))
        .set_condition_expression(prepared.condition)
        .set_expression_attribute_names(prepared.names)
        .set_expression_attribute_values(prepared.values)
        .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            let item = extract_item_from_put_error(&e);
            Err(map_sdk_error_with_item(e, Some(&prepared.table), item))
        }
    }
}

/// Extract the current item image from a rejected conditional put.
fn extract_item_from_put_error(
    err: &SdkError<PutItemError>,
) -> Option<HashMap<String, AttributeValue>> {
    if let SdkError::ServiceError(service_err) = err
        && let PutItemError::ConditionalCheckFailedException(ccf) = service_err.err()
    {
        return ccf.item().cloned();
    }
    None
}
