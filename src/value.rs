//! # Value Model
//!
//! The dynamically-shaped data context a render request binds against.
//!
//! Request bodies arrive as arbitrary JSON (`{"fields": {...}}` at the
//! transport layer); rather than passing an open `serde_json::Value` through
//! the render path, the shape is pinned down to the closed set of forms the
//! resolution engine actually handles. New shapes fail loudly at the
//! deserialization boundary instead of silently at use.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A dynamically-typed data value: scalars, ordered lists, named mappings.
///
/// Deserializes untagged from JSON, so `{"total": 12.5, "items": [...]}`
/// maps directly onto `Map` / `Number` / `List` variants. A `Value` tree is
/// read-only for the duration of one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number. All numbers are carried as `f64`, like the original
    /// deserialized request fields.
    Number(f64),
    /// JSON string.
    String(String),
    /// Ordered list of values (loop targets).
    List(Vec<Value>),
    /// Named mapping of values (the root context, and loop items).
    Map(HashMap<String, Value>),
}

impl Value {
    /// The natural textual form of this value when used as a scalar.
    ///
    /// Strings render verbatim, numbers in their shortest form (`42`, not
    /// `42.0`), booleans as `true`/`false`, and `Null` as the empty string.
    /// Lists and maps misused as scalars fall back to their canonical JSON
    /// text — best-effort, not an error.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    /// The mapping entries, if this value is a `Map`.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The list items, if this value is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a named field, if this value is a `Map`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_shapes() {
        assert_eq!(parse("null"), Value::Null);
        assert_eq!(parse("true"), Value::Bool(true));
        assert_eq!(parse("42"), Value::Number(42.0));
        assert_eq!(parse(r#""hi""#), Value::String("hi".into()));
        assert!(matches!(parse("[1, 2]"), Value::List(_)));
        assert!(matches!(parse(r#"{"a": 1}"#), Value::Map(_)));
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(parse("null").render(), "");
        assert_eq!(parse("true").render(), "true");
        assert_eq!(parse("42").render(), "42");
        assert_eq!(parse("42.5").render(), "42.5");
        assert_eq!(parse(r#""INV-001""#).render(), "INV-001");
    }

    #[test]
    fn test_render_compound_falls_back_to_json() {
        assert_eq!(parse("[1,2]").render(), "[1.0,2.0]");
        assert_eq!(parse(r#"{"a":"b"}"#).render(), r#"{"a":"b"}"#);
    }

    #[test]
    fn test_nested_lookup() {
        let v = parse(r#"{"items": [{"description": "A"}, {"description": "B"}]}"#);
        let items = v.get("items").and_then(Value::as_list).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("description").unwrap().render(), "A");
    }
}
