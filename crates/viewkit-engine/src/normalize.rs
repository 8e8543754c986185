//! Response-shape normalization.
//!
//! Extracts a flat, ordered record sequence from whatever envelope an
//! endpoint wraps its rows in. Unrecognized shapes degrade to an empty
//! sequence; the caller shows that as an empty state.

use serde_json::Value;
use viewkit_model::Record;

/// Conventional wrapper fields, in priority order.
const WRAPPER_FIELDS: [&str; 3] = ["content", "rows", "list"];

/// Public-data envelopes: `response.body.items.item` and `body.items.item`.
const ENVELOPE_PATHS: [&[&str]; 2] = [&["response", "body", "items"], &["body", "items"]];

/// Item keys inside an `items` envelope.
const ITEM_FIELDS: [&str; 2] = ["item", "bs"];

/// Extract the record sequence from a raw payload.
///
/// Accepted shapes, first match wins:
/// 1. a JSON array
/// 2. `{content: [...]}`, `{rows: [...]}`, `{list: [...]}`
/// 3. `{page: {content: [...]}}`
/// 4. `{response: {body: {items: {item: ...}}}}` or `{body: {items: {item: ...}}}`
///    where `item` may be a single object
///
/// A string payload is parsed as JSON first. Elements that are not objects
/// are dropped.
pub fn normalize(payload: &Value) -> Vec<Record> {
    if let Value::String(text) = payload {
        return match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Array(_) | Value::Object(_))) => normalize(&parsed),
            _ => {
                tracing::warn!("Payload is a string that does not hold a JSON document");
                Vec::new()
            }
        };
    }

    match locate_rows(payload) {
        Some(rows) => collect_records(rows),
        None => {
            tracing::warn!(
                shape = shape_name(payload),
                "Unrecognized payload shape, treating as empty"
            );
            Vec::new()
        }
    }
}

fn locate_rows(payload: &Value) -> Option<Rows<'_>> {
    if let Value::Array(items) = payload {
        return Some(Rows::Many(items));
    }
    let object = payload.as_object()?;

    for field in WRAPPER_FIELDS {
        if let Some(Value::Array(items)) = object.get(field) {
            return Some(Rows::Many(items));
        }
    }
    if let Some(Value::Array(items)) = object.get("page").and_then(|page| page.get("content")) {
        return Some(Rows::Many(items));
    }

    ENVELOPE_PATHS.iter().find_map(|path| {
        let items = path.iter().try_fold(payload, |node, key| node.get(key))?;
        ITEM_FIELDS.iter().find_map(|field| match items.get(field)? {
            Value::Array(list) => Some(Rows::Many(list)),
            single @ Value::Object(_) => Some(Rows::One(single)),
            _ => None,
        })
    })
}

enum Rows<'a> {
    Many(&'a [Value]),
    One(&'a Value),
}

fn collect_records(rows: Rows<'_>) -> Vec<Record> {
    let values: &[Value] = match rows {
        Rows::Many(items) => items,
        Rows::One(item) => std::slice::from_ref(item),
    };
    let records: Vec<Record> = values
        .iter()
        .filter_map(|value| Record::from_value(value.clone()))
        .collect();
    if records.len() != values.len() {
        tracing::debug!(
            dropped = values.len() - records.len(),
            "Dropped non-object rows from payload"
        );
    }
    records
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
