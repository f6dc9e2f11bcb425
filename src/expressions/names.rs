//! Attribute-name escaping.
//!
//! DynamoDB rejects expressions that reference reserved words or names with
//! characters outside `[A-Za-z0-9_]` directly; those go through `#`-prefixed
//! placeholders declared in the request's name map. Logical paths here are
//! dotted (`score.health`), and each segment escapes independently: segments
//! that need no escaping pass through verbatim, so a path can mix escaped
//! and plain components and still dot-join correctly.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Sigil prefix for escaped name placeholders.
pub(crate) const NAME_SIGIL: &str = "#attr_";

/// Attribute names that must always be escaped. These are the key and
/// profile attributes the platform's tables actually use that collide with
/// the store's reserved words.
static RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "name",
        "unit",
        "sub",
        "user",
        "group",
        "key",
        "tag",
        "timestamp",
    ])
});

/// Replace the characters a placeholder cannot carry.
pub(crate) fn sanitize(path: &str) -> String {
    path.replace(['-', '.'], "_")
}

fn needs_escape(segment: &str) -> bool {
    if RESERVED_KEYWORDS.contains(segment) {
        return true;
    }
    let mut chars = segment.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_digit() => true,
        Some(first) if !first.is_ascii_alphabetic() && first != '_' => true,
        Some(_) => !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
    }
}

/// Per-request memo of segment escapes.
///
/// Identical segments across multiple paths in one request share one cache
/// entry (`target.tasks` and `target.score` reuse the `target` escape). A
/// fresh map is created per request; nothing leaks across calls.
#[derive(Debug, Default)]
pub struct NameMap {
    segments: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl NameMap {
    /// Create an empty per-request map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape one dotted path, returning the expression fragment to splice
    /// into a projection, condition, or update expression.
    pub fn escape_path(&mut self, path: &str) -> String {
        path.split('.')
            .map(|segment| self.escape_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn escape_segment(&mut self, segment: &str) -> String {
        if !needs_escape(segment) {
            return segment.to_string();
        }
        if let Some(placeholder) = self.segments.get(segment) {
            return placeholder.clone();
        }
        let placeholder = format!("{NAME_SIGIL}{}", sanitize(segment));
        self.segments
            .insert(segment.to_string(), placeholder.clone());
        self.names.insert(placeholder.clone(), segment.to_string());
        placeholder
    }

    /// Build a projection expression from logical attribute paths.
    pub fn projection(&mut self, attributes: &[String]) -> String {
        attributes
            .iter()
            .map(|path| self.escape_path(path))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The wire name map, or `None` when no segment needed escaping.
    pub fn into_names(self) -> Option<HashMap<String, String>> {
        if self.names.is_empty() {
            None
        } else {
            Some(self.names)
        }
    }
}
