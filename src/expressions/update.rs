//! Update expression building.
//!
//! An [`UpdateSpec`] carries up to three independent clause sets:
//! replacements and list appends (both render under `SET`, since
//! `list_append` is a SET function) and numeric increments (`ADD`,
//! including on nested paths). The rendered expression is
//! `SET <...>` and/or `ADD <...>`, concatenated with a single space when
//! both are present. An empty spec fails validation rather than issuing a
//! no-op write.

use serde_json::Value;

use super::names::NameMap;
use super::values::{ValueMap, ValueRole};
use crate::errors::{Error, Result};

/// Composite atomic update: replacements, list appends, and increments.
#[derive(Debug, Clone, Default)]
pub struct UpdateSpec {
    set: Vec<(String, Value)>,
    append: Vec<(String, Value)>,
    add: Vec<(String, Value)>,
}

impl UpdateSpec {
    /// An empty spec; populate it with the builder methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an attribute's value (`SET path = value`).
    #[must_use]
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((path.into(), value.into()));
        self
    }

    /// Append to a list attribute (`SET path = list_append(path, value)`).
    ///
    /// A non-list value is appended as a single element.
    #[must_use]
    pub fn append(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = match value.into() {
            list @ Value::Array(_) => list,
            single => Value::Array(vec![single]),
        };
        self.append.push((path.into(), value));
        self
    }

    /// Increment (or, with a negative delta, decrement) a numeric
    /// attribute (`ADD path delta`). Nested paths are allowed.
    #[must_use]
    pub fn add(mut self, path: impl Into<String>, delta: impl Into<Value>) -> Self {
        self.add.push((path.into(), delta.into()));
        self
    }

    /// True when no clause set has entries.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.append.is_empty() && self.add.is_empty()
    }

    /// Render the combined update expression, binding names and values into
    /// the request's maps.
    pub(crate) fn build(&self, names: &mut NameMap, values: &mut ValueMap) -> Result<String> {
        if self.is_empty() {
            return Err(Error::Validation(
                "update spec must contain at least one SET, append, or ADD clause".into(),
            ));
        }

        for (path, delta) in &self.add {
            if !delta.is_number() {
                return Err(Error::Validation(format!(
                    "ADD requires a numeric delta for '{path}'"
                )));
            }
        }

        let mut set_parts = Vec::with_capacity(self.set.len() + self.append.len());
        for (path, value) in &self.set {
            let name = names.escape_path(path);
            let placeholder = values.bind(path, value, ValueRole::Update)?;
            set_parts.push(format!("{name}={placeholder}"));
        }
        for (path, value) in &self.append {
            let name = names.escape_path(path);
            let placeholder = values.bind(path, value, ValueRole::Update)?;
            set_parts.push(format!("{name}=list_append({name}, {placeholder})"));
        }

        let mut add_parts = Vec::with_capacity(self.add.len());
        for (path, delta) in &self.add {
            let name = names.escape_path(path);
            let placeholder = values.bind(path, delta, ValueRole::Update)?;
            add_parts.push(format!("{name} {placeholder}"));
        }

        let mut expression = String::new();
        if !set_parts.is_empty() {
            expression.push_str("SET ");
            expression.push_str(&set_parts.join(", "));
        }
        if !add_parts.is_empty() {
            if !expression.is_empty() {
                expression.push(' ');
            }
            expression.push_str("ADD ");
            expression.push_str(&add_parts.join(", "));
        }
        Ok(expression)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(spec: &UpdateSpec) -> Result<String> {
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        spec.build(&mut names, &mut values)
    }

    #[test]
    fn set_clauses_render_in_order() {
        let spec = UpdateSpec::new()
            .set("key_a", "value_a")
            .set("key_b", "value_b");
        assert_eq!(render(&spec).unwrap(), "SET key_a=:val_key_a, key_b=:val_key_b");
    }

    #[test]
    fn add_only_renders_without_set() {
        let spec = UpdateSpec::new().add("score.health", 10);
        assert_eq!(
            render(&spec).unwrap(),
            "ADD score.health :val_score_health"
        );
    }

    #[test]
    fn combined_clauses_join_with_a_single_space() {
        let spec = UpdateSpec::new()
            .set("target", Value::Null)
            .append("completed-objectives", json!({"area": "health"}))
            .add("score.health", 80);
        assert_eq!(
            render(&spec).unwrap(),
            "SET target=:val_target, \
             #attr_completed_objectives=list_append(#attr_completed_objectives, \
             :val_completed_objectives) \
             ADD score.health :val_score_health"
        );
    }

    #[test]
    fn append_wraps_single_elements_into_a_list() {
        let spec = UpdateSpec::new().append("badges", "wood");
        let mut names = NameMap::new();
        let mut values = ValueMap::new();
        spec.build(&mut names, &mut values).unwrap();
        let wire = values.into_values().unwrap();
        assert!(matches!(
            &wire[":val_badges"],
            aws_sdk_dynamodb::types::AttributeValue::L(items) if items.len() == 1
        ));
    }

    #[test]
    fn negative_deltas_decrement() {
        let spec = UpdateSpec::new()
            .add("bought_items.first-aid", 1)
            .add("score.health", -1);
        assert_eq!(
            render(&spec).unwrap(),
            "ADD bought_items.#attr_first_aid :val_bought_items_first_aid, \
             score.health :val_score_health"
        );
    }

    #[test]
    fn empty_spec_fails_validation() {
        let err = render(&UpdateSpec::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn non_numeric_add_delta_fails_validation() {
        let spec = UpdateSpec::new().add("score", "ten");
        assert!(matches!(render(&spec), Err(Error::Validation(_))));
    }
}
