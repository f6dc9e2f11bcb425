//! Expression building: placeholder escaping, key conditions, update and
//! condition expressions.
//!
//! Placeholder maps are scoped to exactly one request: every operation
//! creates a fresh [`NameMap`]/[`ValueMap`] pair, threads it through all
//! the expression builders that request needs, and ships the resulting
//! maps alongside the expression strings.

mod condition;
mod key_condition;
mod names;
mod update;
mod values;

pub use condition::{Guard, UpdateCondition};
pub use key_condition::{Operator, SortClause, build_key_condition};
pub use names::NameMap;
pub use update::UpdateSpec;
pub use values::{ValueMap, ValueRole};
