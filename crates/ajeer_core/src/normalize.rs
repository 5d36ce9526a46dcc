//! Field normalization between wire shape and canonical shape.
//!
//! # Responsibility
//! - Map a raw record in either wire (snake_case) or canonical (camelCase)
//!   shape to one canonical record, driven by the entity mapping table.
//! - Build explicit wire payloads for remote writes.
//!
//! # Invariants
//! - Normalization is pure and total: it never panics and never mutates input.
//! - `null`/absent input normalizes to `None`, never to an empty record.
//! - A key is present when it exists with a non-null value. Empty strings are
//!   present and preserved, except for `Label` fields where blank means default.
//! - Payloads only ever contain writable fields from the mapping table.

use crate::model::entity::{Entity, EntitySchema, FieldKind, FieldMapping, ID_FIELD};
use log::warn;
use serde_json::{Map, Value};

/// Canonical-shape record as stored locally.
pub type CanonicalRecord = Map<String, Value>;

/// Which remote write a payload is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Defaults are applied to absent label and flag fields.
    Insert,
    /// Only supplied fields are sent.
    Update,
}

/// Normalizes a raw record into canonical shape.
///
/// Returns `None` for `None`, JSON `null` and non-object values.
pub fn normalize(raw: Option<&Value>, schema: &EntitySchema) -> Option<CanonicalRecord> {
    match raw? {
        Value::Object(object) => Some(normalize_object(object, schema)),
        _ => None,
    }
}

/// Normalizes an object record into canonical shape.
pub fn normalize_object(object: &Map<String, Value>, schema: &EntitySchema) -> CanonicalRecord {
    let mut canonical = Map::new();
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Flag => Some(Value::Bool(
                field
                    .candidates()
                    .filter_map(|key| object.get(key))
                    .find_map(flag_value)
                    .unwrap_or(false),
            )),
            FieldKind::Label { default } => Some(Value::String(
                resolve_label(object, field).unwrap_or_else(|| default.to_string()),
            )),
            FieldKind::Id | FieldKind::CreatedAt | FieldKind::Text => {
                resolve(object, field).and_then(text_value).map(Value::String)
            }
        };
        if let Some(value) = value {
            canonical.insert(field.canonical.to_string(), value);
        }
    }
    canonical
}

/// Normalizes a raw record straight into the typed entity.
pub fn normalize_entity<E: Entity>(raw: &Value) -> Option<E> {
    let canonical = normalize(Some(raw), E::SCHEMA)?;
    match serde_json::from_value(Value::Object(canonical)) {
        Ok(entity) => Some(entity),
        Err(err) => {
            warn!(
                "event=normalize module=normalize status=error entity={} error={}",
                E::SCHEMA.name,
                err
            );
            None
        }
    }
}

/// Builds the wire payload for a remote insert or update.
///
/// Fields are selected from the mapping table one by one; anything else in
/// `canonical` never reaches the remote schema.
pub fn wire_payload(
    canonical: &CanonicalRecord,
    schema: &EntitySchema,
    mode: PayloadMode,
) -> Map<String, Value> {
    let mut payload = Map::new();
    for field in schema.writable_fields() {
        let mut present = field
            .candidates_canonical_first()
            .filter_map(|key| canonical.get(key))
            .filter(|value| !value.is_null());
        // Flags skip candidates that do not parse as a flag.
        let supplied = match field.kind {
            FieldKind::Flag => present.find(|value| flag_value(value).is_some()),
            _ => present.next(),
        };

        let value = match (field.kind, supplied) {
            (FieldKind::Label { default }, Some(value)) => Some(Value::String(
                text_value(value)
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| default.to_string()),
            )),
            (FieldKind::Flag, Some(value)) => flag_value(value).map(Value::Bool),
            (_, Some(value)) => text_value(value).map(Value::String),
            (FieldKind::Label { default }, None) if mode == PayloadMode::Insert => {
                Some(Value::String(default.to_string()))
            }
            (FieldKind::Flag, None) if mode == PayloadMode::Insert => Some(Value::Bool(false)),
            (_, None) => None,
        };

        if let Some(value) = value {
            payload.insert(field.wire.to_string(), value);
        }
    }
    payload
}

/// Returns the id of a record in either shape, if it has a non-empty one.
pub fn record_id(record: &Map<String, Value>) -> Option<String> {
    resolve(record, &ID_FIELD)
        .and_then(text_value)
        .filter(|id| !id.is_empty())
}

/// Reads a field as text from a record in either shape.
pub fn field_text(record: &Map<String, Value>, field: &FieldMapping) -> Option<String> {
    resolve(record, field).and_then(text_value)
}

fn resolve<'a>(object: &'a Map<String, Value>, field: &FieldMapping) -> Option<&'a Value> {
    field
        .candidates()
        .filter_map(|key| object.get(key))
        .find(|value| !value.is_null())
}

fn resolve_label(object: &Map<String, Value>, field: &FieldMapping) -> Option<String> {
    field
        .candidates()
        .filter_map(|key| object.get(key))
        .filter_map(text_value)
        .find(|text| !text.trim().is_empty())
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl FieldMapping {
    fn candidates_canonical_first(&self) -> impl Iterator<Item = &'static str> {
        let aliases = self.aliases;
        [self.canonical, self.wire]
            .into_iter()
            .chain(aliases.iter().copied())
    }
}
