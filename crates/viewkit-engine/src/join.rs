//! Fuzzy multi-key joins between independently fetched collections.
//!
//! Source systems disagree on which field is the join key (id, username,
//! email), so every non-empty candidate value of a secondary row gets its
//! own slot in the index. Primary rows probe their own candidate values in
//! field order and take the first hit.
//!
//! Ties are deterministic: when two secondary rows share a normalized value,
//! the row indexed first (earlier in the secondary collection) keeps the slot.

use std::collections::HashMap;

use serde_json::Value;
use viewkit_model::Record;

/// Normalized value → secondary row lookup.
#[derive(Debug, Clone, Default)]
pub struct JoinIndex {
    rows: Vec<Record>,
    slots: HashMap<String, usize>,
}

/// Normalize a candidate value: trimmed, lower-cased, scalars stringified.
fn normalized(record: &Record, field: &str) -> Option<String> {
    record.scalar_string(field).map(|value| value.to_lowercase())
}

impl JoinIndex {
    /// Index `secondary` under every non-empty candidate value of each row.
    pub fn build<S: AsRef<str>>(secondary: &[Record], candidate_fields: &[S]) -> Self {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut collisions = 0usize;
        for (row, record) in secondary.iter().enumerate() {
            for field in candidate_fields {
                let Some(value) = normalized(record, field.as_ref()) else {
                    continue;
                };
                match slots.get(&value) {
                    Some(&owner) if owner != row => collisions += 1,
                    Some(_) => {}
                    None => {
                        slots.insert(value, row);
                    }
                }
            }
        }
        tracing::debug!(
            rows = secondary.len(),
            slots = slots.len(),
            collisions,
            "Built join index"
        );
        Self {
            rows: secondary.to_vec(),
            slots,
        }
    }

    /// Number of distinct normalized values indexed.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Find the secondary row for `primary`, probing candidate fields in order.
    pub fn lookup<S: AsRef<str>>(
        &self,
        primary: &Record,
        candidate_fields: &[S],
    ) -> Option<&Record> {
        candidate_fields.iter().find_map(|field| {
            let value = normalized(primary, field.as_ref())?;
            self.slots.get(&value).map(|&row| &self.rows[row])
        })
    }
}

/// Attach joined attributes to every primary record.
///
/// `attach` receives `Some(row)` on a hit and `None` on a miss; a miss is not
/// an error, the callback applies its defaults. Each primary record gets at
/// most one match.
pub fn decorate<S, F>(
    primary: &mut [Record],
    index: &JoinIndex,
    candidate_fields: &[S],
    mut attach: F,
) where
    S: AsRef<str>,
    F: FnMut(&mut Record, Option<&Record>),
{
    let mut misses = 0usize;
    for record in primary.iter_mut() {
        let matched = index.lookup(record, candidate_fields);
        if matched.is_none() {
            misses += 1;
        }
        attach(record, matched);
    }
    tracing::debug!(records = primary.len(), misses, "Decorated primary records");
}

/// Stock attach callback: copy `fields` from the matched row, or write
/// `defaults` on a miss.
///
/// Values are overwritten rather than accumulated, so decorating twice with
/// the same index leaves the same attributes.
pub fn attach_fields<'a>(
    fields: &'a [String],
    defaults: &'a [(String, Value)],
) -> impl FnMut(&mut Record, Option<&Record>) + 'a {
    move |record, matched| match matched {
        Some(row) => {
            for field in fields {
                if let Some(value) = row.get(field) {
                    record.set(field.clone(), value.clone());
                }
            }
        }
        None => {
            for (field, value) in defaults {
                record.set(field.clone(), value.clone());
            }
        }
    }
}

/// Collapse rows sharing a key into one row carrying an array of values.
///
/// Useful for secondaries stored one row per pair, such as user/role rows:
/// `[{username: a, role: USER}, {username: a, role: ADMIN}]` becomes
/// `[{username: a, role: USER, roles: [USER, ADMIN]}]`. The first row of a
/// group supplies the other attributes; the output keeps first-seen order.
pub fn group_values(
    rows: &[Record],
    key_field: &str,
    value_field: &str,
    into_field: &str,
) -> Vec<Record> {
    let mut groups: Vec<Record> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let Some(key) = normalized(row, key_field) else {
            groups.push(row.clone());
            continue;
        };
        let position = *positions.entry(key).or_insert_with(|| {
            let mut first = row.clone();
            first.set(into_field.to_string(), Value::Array(Vec::new()));
            groups.push(first);
            groups.len() - 1
        });
        let Some(value) = row.get(value_field) else {
            continue;
        };
        let mut values = match groups[position].get(into_field) {
            Some(Value::Array(values)) => values.clone(),
            _ => Vec::new(),
        };
        if !values.contains(value) {
            values.push(value.clone());
        }
        groups[position].set(into_field.to_string(), Value::Array(values));
    }
    groups
}
