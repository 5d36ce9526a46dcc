//! On-device record storage for one entity family.
//!
//! # Responsibility
//! - Keep every record of a family as one JSON array under one storage key.
//! - Assign ids, creation timestamps and local sequence numbers to records
//!   created while the remote store is unavailable.
//!
//! # Invariants
//! - Array order is insertion order; reads never reorder it.
//! - Absent or undecodable data reads as an empty collection.
//! - Writes re-encode the full array; they are not atomic with respect to
//!   concurrent writers (last writer wins).
//! - Unknown ids on delete and status toggle are no-ops, not errors.

use crate::id::{generate_id, now_timestamp};
use crate::model::entity::{Entity, CREATED_AT_FIELD, ID_FIELD};
use crate::normalize::{field_text, normalize_entity, normalize_object, record_id, CanonicalRecord};
use crate::repo::kv_store::{KeyValueStore, KvError};
use crate::sequence::next_local;
use log::{debug, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

pub type LocalResult<T> = Result<T, LocalStoreError>;

#[derive(Debug)]
pub enum LocalStoreError {
    Storage(KvError),
    Encode(serde_json::Error),
    /// A record that was just written could not be read back as an entity.
    InvalidRecord(&'static str),
}

impl Display for LocalStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "local storage failed: {err}"),
            Self::Encode(err) => write!(f, "failed to encode local records: {err}"),
            Self::InvalidRecord(entity) => write!(f, "stored {entity} is not a valid record"),
        }
    }
}

impl Error for LocalStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidRecord(_) => None,
        }
    }
}

impl From<KvError> for LocalStoreError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for LocalStoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Local store adapter over a `KeyValueStore`.
pub struct LocalStore<E: Entity> {
    kv: Arc<dyn KeyValueStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> LocalStore<E> {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            _entity: PhantomData,
        }
    }

    fn key(&self) -> &'static str {
        E::SCHEMA.storage_key
    }

    /// Loads the raw stored array.
    ///
    /// Missing key, storage failures and malformed JSON all read as empty;
    /// non-object array elements are skipped.
    pub fn load_records(&self) -> Vec<CanonicalRecord> {
        let raw = match self.kv.get(self.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=local_load module=local status=degraded key={} error={}",
                    self.key(),
                    err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                warn!(
                    "event=local_load module=local status=degraded key={} error_code=invalid_json error={}",
                    self.key(),
                    err
                );
                Vec::new()
            }
        }
    }

    fn persist(&self, records: &[CanonicalRecord]) -> LocalResult<()> {
        let encoded = serde_json::to_string(records)?;
        self.kv.set(self.key(), &encoded)?;
        debug!(
            "event=local_persist module=local status=ok key={} count={}",
            self.key(),
            records.len()
        );
        Ok(())
    }

    /// Every record, in stored order.
    pub fn list(&self) -> Vec<E> {
        self.load_records()
            .into_iter()
            .filter_map(|record| normalize_entity::<E>(&Value::Object(record)))
            .collect()
    }

    /// First record with `id`, if any.
    pub fn get(&self, id: &str) -> Option<E> {
        self.load_records()
            .into_iter()
            .find(|record| record_id(record).as_deref() == Some(id))
            .and_then(|record| normalize_entity::<E>(&Value::Object(record)))
    }

    /// Creates or merges a record given in canonical shape.
    ///
    /// - Without an id: a new id, `createdAt` and (when the family has one) the
    ///   next local sequence number are assigned before appending.
    /// - With a known id: supplied fields overwrite stored ones, the rest stay.
    /// - With an unknown id: the record is appended as new under that id.
    pub fn save(&self, incoming: CanonicalRecord) -> LocalResult<E> {
        let mut records = self.load_records();

        let stored = match record_id(&incoming) {
            Some(id) => match records
                .iter()
                .position(|record| record_id(record).as_deref() == Some(id.as_str()))
            {
                Some(index) => {
                    let mut merged = normalize_object(&records[index], E::SCHEMA);
                    merged.extend(incoming);
                    let merged = normalize_object(&merged, E::SCHEMA);
                    records[index] = merged.clone();
                    merged
                }
                None => {
                    let record = self.stamp_new(incoming, &records, false);
                    records.push(record.clone());
                    record
                }
            },
            None => {
                let mut record = incoming;
                record.insert(ID_FIELD.canonical.to_string(), Value::String(generate_id()));
                let record = self.stamp_new(record, &records, true);
                records.push(record.clone());
                record
            }
        };

        self.persist(&records)?;
        normalize_entity(&Value::Object(stored))
            .ok_or(LocalStoreError::InvalidRecord(E::SCHEMA.name))
    }

    /// Removes every record with `id`. Unknown ids leave storage untouched.
    pub fn delete(&self, id: &str) -> LocalResult<()> {
        let mut records = self.load_records();
        let before = records.len();
        records.retain(|record| record_id(record).as_deref() != Some(id));
        if records.len() == before {
            return Ok(());
        }
        self.persist(&records)
    }

    /// Sets the status flag in place. Returns `None` when `id` is unknown.
    pub fn set_status(&self, id: &str, flag: bool) -> LocalResult<Option<E>> {
        let mut records = self.load_records();
        let Some(index) = records
            .iter()
            .position(|record| record_id(record).as_deref() == Some(id))
        else {
            return Ok(None);
        };

        let mut record = normalize_object(&records[index], E::SCHEMA);
        record.insert(E::SCHEMA.status.canonical.to_string(), Value::Bool(flag));
        records[index] = record.clone();
        self.persist(&records)?;
        Ok(normalize_entity(&Value::Object(record)))
    }

    /// Fills in creation-time fields. `existing` must not contain `record`.
    fn stamp_new(
        &self,
        mut record: CanonicalRecord,
        existing: &[CanonicalRecord],
        fresh: bool,
    ) -> CanonicalRecord {
        if fresh || field_text(&record, &CREATED_AT_FIELD).is_none() {
            record.insert(
                CREATED_AT_FIELD.canonical.to_string(),
                Value::String(now_timestamp()),
            );
        }

        if let Some(format) = E::SCHEMA.sequence {
            let supplied = record
                .get(format.canonical)
                .and_then(Value::as_str)
                .is_some_and(|number| !number.trim().is_empty());
            if !supplied {
                let next = next_local(&format, existing);
                record.insert(
                    format.canonical.to_string(),
                    Value::String(format.format(next)),
                );
            }
        }

        normalize_object(&record, E::SCHEMA)
    }
}
