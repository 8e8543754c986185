//! Schema-less API records and their typed accessors.
//!
//! A [`Record`] is whatever object the API sent for one resource instance.
//! Field presence and typing vary between endpoints, so components never
//! read the underlying map directly; they go through the narrow accessors
//! below, each of which answers one question ("is there a usable string
//! here?", "is there a number here?").

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One API resource instance: an opaque mapping of field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw field access. `Null` is reported as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    /// Returns true if the field exists and is not `null`.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// String field, trimmed, if present and non-empty after trimming.
    ///
    /// Numbers and booleans are not coerced.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            }
            _ => None,
        }
    }

    /// JSON number field. serde_json numbers are always finite.
    pub fn number(&self, field: &str) -> Option<&Number> {
        match self.get(field)? {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Numeric field as `f64`, also accepting numeric strings.
    pub fn lenient_f64(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Scalar field stringified (strings trimmed), `None` when absent,
    /// empty, or not a scalar.
    pub fn scalar_string(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First field in `fields` holding a non-empty string.
    pub fn first_text<'a, S: AsRef<str>>(&'a self, fields: &[S]) -> Option<(&'a str, &'a str)> {
        fields.iter().find_map(|field| {
            let field = field.as_ref();
            self.0
                .get_key_value(field)
                .and_then(|(name, _)| self.text(field).map(|value| (name.as_str(), value)))
        })
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Merge `other` into this record; fields in `other` win.
    pub fn merge(&mut self, other: &Record) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Iterate over all fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert back into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a [`Record`] from a `serde_json::json!` object literal.
///
/// Non-object literals produce an empty record.
#[macro_export]
macro_rules! record {
    ($($json:tt)+) => {
        $crate::Record::from_value(::serde_json::json!($($json)+)).unwrap_or_default()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_trims_and_skips_blank() {
        let record = crate::record!({"name": "  Kim  ", "blank": "   ", "n": 3});
        assert_eq!(record.text("name"), Some("Kim"));
        assert_eq!(record.text("blank"), None);
        assert_eq!(record.text("n"), None);
        assert_eq!(record.text("missing"), None);
    }

    #[test]
    fn null_is_absent() {
        let record = crate::record!({"id": null});
        assert!(!record.has("id"));
        assert!(record.number("id").is_none());
    }

    #[test]
    fn scalar_string_stringifies_numbers_and_bools() {
        let record = crate::record!({"id": 42, "ok": true, "obj": {"a": 1}});
        assert_eq!(record.scalar_string("id").as_deref(), Some("42"));
        assert_eq!(record.scalar_string("ok").as_deref(), Some("true"));
        assert_eq!(record.scalar_string("obj"), None);
    }

    #[test]
    fn first_text_respects_field_order() {
        let record = crate::record!({"uuid": "u-1", "key": "k-1"});
        assert_eq!(record.first_text(&["key", "uuid"]), Some(("key", "k-1")));
        assert_eq!(record.first_text(&["missing", "uuid"]), Some(("uuid", "u-1")));
    }

    #[test]
    fn lenient_f64_accepts_numeric_strings() {
        let record = crate::record!({"a": "2.5", "b": 3, "c": "x"});
        assert_eq!(record.lenient_f64("a"), Some(2.5));
        assert_eq!(record.lenient_f64("b"), Some(3.0));
        assert_eq!(record.lenient_f64("c"), None);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("x")).is_none());
    }
}
