//! Value placeholder binding.
//!
//! Literal values never appear inline in an expression; each binds to a
//! `:val_`-prefixed placeholder shipped in the request's value map.
//! Placeholder names derive deterministically from the attribute path plus
//! an operation-role suffix, so a SET clause and a condition clause on the
//! same attribute never collide within one request.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use super::names::sanitize;
use crate::errors::Result;
use crate::value::to_attribute_value;

/// Sigil prefix for value placeholders.
pub(crate) const VALUE_SIGIL: &str = ":val_";

/// Which clause a binding belongs to. Update-role bindings (also used by
/// key conditions) take the plain form; condition-role bindings append a
/// suffix so they cannot clash with an update binding for the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRole {
    /// SET/ADD clauses and key conditions: `:val_<path>`.
    Update,
    /// Condition expressions: `:val_<path>_condition`.
    Condition,
}

impl ValueRole {
    fn suffix(self) -> &'static str {
        match self {
            ValueRole::Update => "",
            ValueRole::Condition => "_condition",
        }
    }
}

/// Per-request map of value placeholders to wire values.
#[derive(Debug, Default)]
pub struct ValueMap {
    values: HashMap<String, AttributeValue>,
}

impl ValueMap {
    /// Create an empty per-request map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, returning its placeholder.
    ///
    /// When the derived name is already taken within this request (two sort
    /// clauses on the same attribute, say), a numeric suffix disambiguates
    /// deterministically: `:val_tag`, `:val_tag_2`, `:val_tag_3`, …
    pub fn bind(&mut self, path: &str, value: &Value, role: ValueRole) -> Result<String> {
        let base = format!("{VALUE_SIGIL}{}{}", sanitize(path), role.suffix());
        let mut placeholder = base.clone();
        let mut n = 2;
        while self.values.contains_key(&placeholder) {
            placeholder = format!("{base}_{n}");
            n += 1;
        }
        self.values.insert(placeholder.clone(), to_attribute_value(value)?);
        Ok(placeholder)
    }

    /// The wire value map, or `None` when nothing was bound.
    pub fn into_values(self) -> Option<HashMap<String, AttributeValue>> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn placeholders_derive_from_sanitized_paths() {
        let mut values = ValueMap::new();
        let placeholder = values
            .bind("release-id", &json!(100000), ValueRole::Update)
            .unwrap();
        assert_eq!(placeholder, ":val_release_id");

        let nested = values
            .bind("score.health", &json!(5), ValueRole::Update)
            .unwrap();
        assert_eq!(nested, ":val_score_health");
    }

    #[test]
    fn condition_role_never_collides_with_update_role() {
        let mut values = ValueMap::new();
        let set = values.bind("completed", &json!(true), ValueRole::Update).unwrap();
        let guard = values
            .bind("completed", &json!(false), ValueRole::Condition)
            .unwrap();
        assert_eq!(set, ":val_completed");
        assert_eq!(guard, ":val_completed_condition");

        let map = values.into_values().unwrap();
        assert_eq!(map[":val_completed"], AttributeValue::Bool(true));
        assert_eq!(map[":val_completed_condition"], AttributeValue::Bool(false));
    }

    #[test]
    fn repeated_paths_disambiguate_deterministically() {
        let mut values = ValueMap::new();
        let first = values.bind("tag", &json!("a"), ValueRole::Update).unwrap();
        let second = values.bind("tag", &json!("b"), ValueRole::Update).unwrap();
        let third = values.bind("tag", &json!("c"), ValueRole::Update).unwrap();
        assert_eq!(first, ":val_tag");
        assert_eq!(second, ":val_tag_2");
        assert_eq!(third, ":val_tag_3");
    }

    #[test]
    fn empty_map_emits_no_wire_field() {
        assert!(ValueMap::new().into_values().is_none());
    }
}
