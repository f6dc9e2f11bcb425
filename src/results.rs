//! Decoded operation results.
//!
//! The continuation cursor is the store's native pagination key, echoed
//! back unmodified on the next page request; the engine never inspects it.
//! Consumed-capacity metadata is passed through uninterpreted.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::errors::Result;
use crate::value::{Item, attribute_values_to_item};

/// Opaque continuation cursor: the store's `LastEvaluatedKey`, unmodified.
pub type Cursor = HashMap<String, AttributeValue>;

/// Store-reported capacity units for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapacityUnits {
    pub total: Option<f64>,
    pub read: Option<f64>,
    pub write: Option<f64>,
}

impl CapacityUnits {
    fn from_capacity(capacity: &aws_sdk_dynamodb::types::Capacity) -> Self {
        Self {
            total: capacity.capacity_units(),
            read: capacity.read_capacity_units(),
            write: capacity.write_capacity_units(),
        }
    }
}

/// Store-reported cost metadata, passed through but not interpreted.
#[derive(Debug, Clone, Default)]
pub struct ConsumedCapacity {
    pub table_name: Option<String>,
    pub total: CapacityUnits,
    pub table: Option<CapacityUnits>,
    pub local_secondary_indexes: Option<HashMap<String, CapacityUnits>>,
    pub global_secondary_indexes: Option<HashMap<String, CapacityUnits>>,
}

impl ConsumedCapacity {
    pub(crate) fn from_sdk(capacity: &aws_sdk_dynamodb::types::ConsumedCapacity) -> Self {
        let index_map = |indexes: Option<&HashMap<String, aws_sdk_dynamodb::types::Capacity>>| {
            indexes.map(|map| {
                map.iter()
                    .map(|(name, cap)| (name.clone(), CapacityUnits::from_capacity(cap)))
                    .collect()
            })
        };

        Self {
            table_name: capacity.table_name().map(str::to_string),
            total: CapacityUnits {
                total: capacity.capacity_units(),
                read: capacity.read_capacity_units(),
                write: capacity.write_capacity_units(),
            },
            table: capacity.table().map(CapacityUnits::from_capacity),
            local_secondary_indexes: index_map(capacity.local_secondary_indexes()),
            global_secondary_indexes: index_map(capacity.global_secondary_indexes()),
        }
    }
}

/// Result of a `Query`, `Scan`, or synthesized item list.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Decoded items in key order (or reverse order for backward scans).
    pub items: Vec<Item>,
    /// Number of items in this page.
    pub count: i32,
    /// Number of items the store evaluated before filtering.
    pub scanned_count: i32,
    /// Continuation cursor; absent when the result set is exhausted.
    pub cursor: Option<Cursor>,
    /// Store-reported cost metadata.
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl QueryResult {
    /// Decode a wire page.
    pub(crate) fn decode(
        raw_items: Vec<HashMap<String, AttributeValue>>,
        count: i32,
        scanned_count: i32,
        cursor: Option<Cursor>,
        consumed_capacity: Option<ConsumedCapacity>,
    ) -> Result<Self> {
        let items = raw_items
            .into_iter()
            .map(attribute_values_to_item)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            items,
            count,
            scanned_count,
            cursor,
            consumed_capacity,
        })
    }

    /// Synthesize a result from an in-memory item list, preserving the
    /// `{items, count, cursor}` shape of a native query result. Used when a
    /// caller pre-fetched through a secondary mechanism such as batch-get.
    pub fn from_items(items: Vec<Item>) -> Self {
        let count = items.len() as i32;
        Self {
            items,
            count,
            scanned_count: count,
            cursor: None,
            consumed_capacity: None,
        }
    }
}

/// Result of a `Get`. A missing item is `item: None`, not an error.
#[derive(Debug, Clone, Default)]
pub struct GetResult {
    pub item: Option<Item>,
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl GetResult {
    /// Wrap an already-decoded item, mirroring the shape of a store read.
    pub fn from_item(item: Option<Item>) -> Self {
        Self {
            item,
            consumed_capacity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_items_preserves_the_query_result_shape() {
        let items = vec![
            json!({"user": "a"}).as_object().unwrap().clone(),
            json!({"user": "b"}).as_object().unwrap().clone(),
        ];
        let result = QueryResult::from_items(items);
        assert_eq!(result.count, 2);
        assert_eq!(result.items.len(), 2);
        assert!(result.cursor.is_none());
    }

    #[test]
    fn decode_normalizes_numbers() {
        let mut raw = HashMap::new();
        raw.insert("release-id".to_string(), AttributeValue::N("100001".to_string()));
        let result = QueryResult::decode(vec![raw], 1, 1, None, None).unwrap();
        assert_eq!(result.items[0]["release-id"], json!(100001));
    }

    #[test]
    fn absent_item_is_not_an_error() {
        let result = GetResult::from_item(None);
        assert!(result.item.is_none());
    }
}
