//! Condition expressions for conditional writes.
//!
//! [`Guard`] implements the create-side checks ("create only if the slot is
//! empty", "claim only once"): existence and inequality clauses joined with
//! AND. [`UpdateCondition`] gates updates on attribute equality or on a
//! caller-supplied boolean expression.

use serde_json::Value;

use super::names::NameMap;
use super::values::{ValueMap, ValueRole};
use crate::errors::Result;
use crate::schema::KeySchema;

/// Conditional guard for `Create`: the write only succeeds when every
/// clause holds against the item's current state.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    not_exists: Vec<String>,
    not_equals: Vec<(String, Value)>,
}

impl Guard {
    /// An empty guard; populate it with the builder methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require that an attribute is absent (`attribute_not_exists(path)`).
    #[must_use]
    pub fn must_not_exist(mut self, path: impl Into<String>) -> Self {
        self.not_exists.push(path.into());
        self
    }

    /// Require that an attribute does not already hold the given value
    /// (`NOT path = value`).
    #[must_use]
    pub fn must_not_equal(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.not_equals.push((path.into(), value.into()));
        self
    }

    /// The guard used for "insert only if absent": no item with this key
    /// may exist yet. Checking the partition attribute (and the sort
    /// attribute, when declared) for absence is how the store expresses it.
    pub fn key_absent(schema: &KeySchema) -> Self {
        let mut guard = Guard::new().must_not_exist(&schema.partition);
        if let Some(sort) = &schema.sort {
            guard = guard.must_not_exist(sort);
        }
        guard
    }

    /// True when no clause was added.
    pub fn is_empty(&self) -> bool {
        self.not_exists.is_empty() && self.not_equals.is_empty()
    }

    /// Render the condition expression, or `None` for an empty guard.
    ///
    /// Clauses join with AND.
    pub(crate) fn build(
        &self,
        names: &mut NameMap,
        values: &mut ValueMap,
    ) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut clauses = Vec::with_capacity(self.not_exists.len() + self.not_equals.len());
        for path in &self.not_exists {
            let name = names.escape_path(path);
            clauses.push(format!("attribute_not_exists({name})"));
        }
        for (path, value) in &self.not_equals {
            let name = names.escape_path(path);
            let placeholder = values.bind(path, value, ValueRole::Condition)?;
            clauses.push(format!("NOT {name} = {placeholder}"));
        }
        Ok(Some(clauses.join(" AND ")))
    }
}

/// Condition gating an `Update`.
#[derive(Debug, Clone)]
pub enum UpdateCondition {
    /// Every listed attribute must currently equal its value.
    Equals(Vec<(String, Value)>),
    /// A caller-supplied boolean expression, passed through verbatim. The
    /// caller owns any placeholders it references.
    Expression(String),
}

impl UpdateCondition {
    /// Convenience for the common single-attribute equality condition.
    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        UpdateCondition::Equals(vec![(path.into(), value.into())])
    }

    /// Render the condition expression.
    pub(crate) fn build(&self, names: &mut NameMap, values: &mut ValueMap) -> Result<String> {
        match self {
            UpdateCondition::Expression(raw) => Ok(raw.clone()),
            UpdateCondition::Equals(pairs) => {
                let mut clauses = Vec::with_capacity(pairs.len());
                for (path, value) in pairs {
                    let name = names.escape_path(path);
                    let placeholder = values.bind(path, value, ValueRole::Condition)?;
                    clauses.push(format!("{name} = {placeholder}"));
                }
                Ok(clauses.join(" AND "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render_guard(guard: &Guard) -> Option<String> {
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        guard.build(&mut names, &mut values).unwrap()
    }

    #[test]
    fn empty_guard_renders_nothing() {
        assert!(render_guard(&Guard::new()).is_none());
    }

    #[test]
    fn key_absent_covers_both_key_attributes() {
        let schema = KeySchema {
            partition: "user".to_string(),
            sort: Some("tag".to_string()),
        };
        let expr = render_guard(&Guard::key_absent(&schema)).unwrap();
        assert_eq!(
            expr,
            "attribute_not_exists(#attr_user) AND attribute_not_exists(#attr_tag)"
        );
    }

    #[test]
    fn clauses_join_with_and() {
        let guard = Guard::new()
            .must_not_exist("target")
            .must_not_equal("index", json!(7));
        assert_eq!(
            render_guard(&guard).unwrap(),
            "attribute_not_exists(target) AND NOT index = :val_index_condition"
        );
    }

    #[test]
    fn equality_condition_uses_condition_role_placeholders() {
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        let expr = UpdateCondition::equals("scouters_code", "s3cret")
            .build(&mut names, &mut values)
            .unwrap();
        assert_eq!(expr, "scouters_code = :val_scouters_code_condition");
    }

    #[test]
    fn raw_expressions_pass_through_verbatim() {
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        let expr = UpdateCondition::Expression("size(tasks) > :min".to_string())
            .build(&mut names, &mut values)
            .unwrap();
        assert_eq!(expr, "size(tasks) > :min");
        assert!(values.into_values().is_none());
    }
}
