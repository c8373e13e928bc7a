//! Ordered extraction rules over loosely-typed provider JSON.
//!
//! Each field of a normalized song is resolved by a [`FieldChain`]: a list of
//! pure rules tried in order, the first `Some` wins. Rules never panic on
//! missing keys or unexpected types; they return `None` and the chain moves
//! on.

use serde_json::Value;
use std::fmt;

/// One extraction strategy for a field
pub type Rule<T> = fn(&Value) -> Option<T>;

/// A named, ordered list of extraction rules
pub struct FieldChain<T: 'static> {
    field: &'static str,
    rules: &'static [Rule<T>],
}

impl<T: 'static> FieldChain<T> {
    pub const fn new(field: &'static str, rules: &'static [Rule<T>]) -> Self {
        Self { field, rules }
    }

    /// Evaluate rules in order until one yields a value
    pub fn resolve(&self, raw: &Value) -> Option<T> {
        self.rules.iter().find_map(|rule| rule(raw))
    }

    #[cfg(test)]
    pub(crate) fn field(&self) -> &'static str {
        self.field
    }
}

impl<T: 'static> fmt::Debug for FieldChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldChain")
            .field("field", &self.field)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Follow a key path through nested objects
pub fn path<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(raw, |node, key| node.get(*key))
}

/// A trimmed, non-empty string
pub fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String at a key path, trimmed and non-empty
pub fn str_at(raw: &Value, keys: &[&str]) -> Option<String> {
    path(raw, keys).and_then(non_empty_str)
}

/// Identifier rendered as text, whether the provider sent a string or a number
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_empty_str(value),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Unsigned integer from a JSON number or a numeric string
pub fn u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f.round() as u32)
            }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Names collected from an array of `{ "name": ... }` objects, joined with ", "
pub fn joined_names(value: &Value) -> Option<String> {
    let names: Vec<String> = value
        .as_array()?
        .iter()
        .filter_map(|entry| entry.get("name").and_then(non_empty_str))
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
