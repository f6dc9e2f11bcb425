//! Logical table schemas.
//!
//! A [`TableDescriptor`] declares an entity's partition key, optional sort
//! key, and named secondary indices. Descriptors are created once at process
//! start and never mutated; everything else here is pure lookup and
//! validation performed before any network call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::value::Item;

/// The partition/sort attribute pair a query or write resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    /// Partition (hash) key attribute name.
    pub partition: String,
    /// Sort (range) key attribute name, if the schema declares one.
    pub sort: Option<String>,
}

impl KeySchema {
    /// Assemble a wire key from partition and sort values.
    ///
    /// With `full` set, both declared key components must be present.
    /// Partial keys (`full = false`) are used for key conditions, where the
    /// sort component is optional. Supplying a sort value against a schema
    /// without a sort key always fails.
    pub fn key(
        &self,
        partition: Option<&Value>,
        sort: Option<&Value>,
        full: bool,
    ) -> Result<Item> {
        if sort.is_some() && self.sort.is_none() {
            return Err(Error::Validation(
                "sort key was given but the schema does not declare one".into(),
            ));
        }
        if full {
            if partition.is_none() {
                return Err(Error::Validation("partition key cannot be empty".into()));
            }
            if self.sort.is_some() && sort.is_none() {
                return Err(Error::Validation("sort key cannot be empty".into()));
            }
        }

        let mut key = Item::new();
        if let Some(value) = partition {
            key.insert(self.partition.clone(), value.clone());
        }
        if let (Some(attr), Some(value)) = (&self.sort, sort) {
            key.insert(attr.clone(), value.clone());
        }
        Ok(key)
    }
}

/// Immutable description of one entity's table: primary key schema plus any
/// named secondary indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Physical table name.
    pub table_name: String,
    /// Primary key schema.
    pub primary: KeySchema,
    /// Secondary index name to its key schema.
    pub indices: HashMap<String, KeySchema>,
}

impl TableDescriptor {
    /// Declare a table with a partition key only.
    pub fn new(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary: KeySchema {
                partition: partition_key.into(),
                sort: None,
            },
            indices: HashMap::new(),
        }
    }

    /// Declare the sort key attribute.
    #[must_use]
    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.primary.sort = Some(sort_key.into());
        self
    }

    /// Declare a named secondary index.
    #[must_use]
    pub fn with_index(
        mut self,
        index_name: impl Into<String>,
        partition_key: impl Into<String>,
        sort_key: Option<&str>,
    ) -> Self {
        self.indices.insert(
            index_name.into(),
            KeySchema {
                partition: partition_key.into(),
                sort: sort_key.map(str::to_string),
            },
        );
        self
    }

    /// Resolve the key schema a request runs against.
    ///
    /// With no index name, the primary schema applies. A name the descriptor
    /// does not declare fails with [`Error::UnknownIndex`].
    pub fn key_schema(&self, index: Option<&str>) -> Result<&KeySchema> {
        match index {
            None => Ok(&self.primary),
            Some(name) => self
                .indices
                .get(name)
                .ok_or_else(|| Error::UnknownIndex(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn logs_descriptor() -> TableDescriptor {
        TableDescriptor::new("logs", "user")
            .with_sort_key("tag")
            .with_index("ByTimestamp", "user", Some("timestamp"))
    }

    #[test]
    fn resolves_primary_and_index_schemas() {
        let descriptor = logs_descriptor();

        let primary = descriptor.key_schema(None).unwrap();
        assert_eq!(primary.partition, "user");
        assert_eq!(primary.sort.as_deref(), Some("tag"));

        let index = descriptor.key_schema(Some("ByTimestamp")).unwrap();
        assert_eq!(index.sort.as_deref(), Some("timestamp"));
    }

    #[test]
    fn undeclared_index_fails() {
        let descriptor = logs_descriptor();
        let err = descriptor.key_schema(Some("ByArea")).unwrap_err();
        assert!(matches!(err, Error::UnknownIndex(name) if name == "ByArea"));
    }

    #[test]
    fn full_key_requires_both_components() {
        let schema = logs_descriptor().primary;

        let key = schema
            .key(Some(&json!("sub-1")), Some(&json!("REWARD")), true)
            .unwrap();
        assert_eq!(key["user"], json!("sub-1"));
        assert_eq!(key["tag"], json!("REWARD"));

        assert!(schema.key(Some(&json!("sub-1")), None, true).is_err());
        assert!(schema.key(None, Some(&json!("REWARD")), true).is_err());
    }

    #[test]
    fn partial_key_allows_missing_sort() {
        let schema = logs_descriptor().primary;
        let key = schema.key(Some(&json!("sub-1")), None, false).unwrap();
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn sort_value_without_declared_sort_key_fails() {
        let schema = TableDescriptor::new("items", "hash").primary;
        let err = schema
            .key(Some(&json!("h")), Some(&json!("r")), true)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
