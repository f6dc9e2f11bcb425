//! Update-item operation.
//!
//! Builds one combined expression from the update spec's SET and ADD
//! clauses, optionally gated by a condition; the write is a single atomic
//! round trip.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnConsumedCapacity, ReturnValue};

use crate::errors::{Result, map_sdk_error_with_item};
use crate::expressions::{NameMap, UpdateCondition, UpdateSpec, ValueMap};
use crate::results::ConsumedCapacity;
use crate::value::{Item, attribute_values_to_item, item_to_attribute_values};

/// Which item image the store returns after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnMode {
    None,
    AllOld,
    UpdatedOld,
    AllNew,
    /// The platform's historical default: only the attributes the write
    /// touched, as they are after it.
    #[default]
    UpdatedNew,
}

impl ReturnMode {
    fn to_return_value(self) -> Option<ReturnValue> {
        match self {
            ReturnMode::None => None,
            ReturnMode::AllOld => Some(ReturnValue::AllOld),
            ReturnMode::UpdatedOld => Some(ReturnValue::UpdatedOld),
            ReturnMode::AllNew => Some(ReturnValue::AllNew),
            ReturnMode::UpdatedNew => Some(ReturnValue::UpdatedNew),
        }
    }
}

/// Prepared update-item request.
#[derive(Debug)]
pub struct PreparedUpdate {
    pub table: String,
    pub key: HashMap<String, AttributeValue>,
    pub update_expression: String,
    pub condition: Option<String>,
    pub names: Option<HashMap<String, String>>,
    pub values: Option<HashMap<String, AttributeValue>>,
    pub return_values: Option<ReturnValue>,
}

/// Result of an update: the requested item image (if any) plus cost
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    pub attributes: Option<Item>,
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Build an update request. The update spec and the optional condition
/// share one name/value map pair, so an update and a condition on the same
/// attribute cannot collide.
pub fn prepare_update(
    table: &str,
    key: &Item,
    updates: &UpdateSpec,
    condition: Option<&UpdateCondition>,
    return_mode: ReturnMode,
) -> Result<PreparedUpdate> {
    let mut names = NameMap::new();
    let mut values = ValueMap::new();

    let update_expression = updates.build(&mut names, &mut values)?;
    let condition = condition
        .map(|condition| condition.build(&mut names, &mut values))
        .transpose()?;

    Ok(PreparedUpdate {
        table: table.to_string(),
        key: item_to_attribute_values(key)?,
        update_expression,
        condition,
        names: names.into_names(),
        values: values.into_values(),
        return_values: return_mode.to_return_value(),
    })
}

/// Execute the update. A failed condition surfaces as
/// `ConditionalCheckFailed` with the store's current item image when
/// available.
pub async fn execute_update(client: &Client, prepared: PreparedUpdate) -> Result<UpdateResult> {
    tracing::debug!(
        table = %prepared.table,
        expression = %prepared.update_expression,
        condition = prepared.condition.as_deref().unwrap_or("-"),
        "update_item"
    );

    let has_return_values = prepared.return_values.is_some();

    let result = client
        .update_item()
        .table_name(&prepared.table)
        .set_key(Some(prepared.key))
        .update_expression(prepared.update_expression)
        .set_condition_expression(prepared.condition)
        .set_expression_attribute_names(prepared.names)
        .set_expression_attribute_values(prepared.values)
        .set_return_values(prepared.return_values)
        .return_consumed_capacity(ReturnConsumedCapacity::Total)
        .send()
        .await;

    match result {
        Ok(output) => {
            let consumed_capacity = output
                .consumed_capacity()
                .map(ConsumedCapacity::from_sdk);
            let attributes = if has_return_values {
                output.attributes.map(attribute_values_to_item).transpose()?
            } else {
                None
            };
            Ok(UpdateResult {
                attributes,
                consumed_capacity,
            })
        }
        Err(e) => {
            let item = extract_item_from_update_error(&e);
            Err(map_sdk_error_with_item(e, Some(&prepared.table), item))
        }
    }
}

/// Extract the current item image from a rejected conditional update.
fn extract_item_from_update_error(
    err: &SdkError<UpdateItemError>,
) -> Option<HashMap<String, AttributeValue>> {
    if let SdkError::ServiceError(service_err) = err
        && let UpdateItemError::ConditionalCheckFailedException(ccf) = service_err.err()
    {
        return ccf.item().cloned();
    }
    None
}
