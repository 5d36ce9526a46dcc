//! Entity schema and the wire/canonical field-mapping table.
//!
//! # Responsibility
//! - Describe, per entity family, how canonical (camelCase) names map to
//!   wire (snake_case) column names.
//! - Carry the storage coordinates of an entity: remote table and local key.
//!
//! # Invariants
//! - Every schema contains exactly one `Id` and one `CreatedAt` field.
//! - `Label` defaults are never empty.
//! - `status` is one of the `Flag` fields in `fields`.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Store-assigned opaque identifier.
pub const ID_FIELD: FieldMapping = FieldMapping::new("id", "id", FieldKind::Id);

/// Creation timestamp, also the sort key for "most recent" queries.
pub const CREATED_AT_FIELD: FieldMapping =
    FieldMapping::new("createdAt", "created_at", FieldKind::CreatedAt);

/// How a field is resolved and defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    CreatedAt,
    /// Free text; absent stays absent.
    Text,
    /// Boolean flag, `false` when absent.
    Flag,
    /// Free-text type label; absent or blank maps to `default`.
    Label { default: &'static str },
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub canonical: &'static str,
    pub wire: &'static str,
    /// Legacy canonical names still found in old local records.
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldMapping {
    pub const fn new(canonical: &'static str, wire: &'static str, kind: FieldKind) -> Self {
        Self {
            canonical,
            wire,
            aliases: &[],
            kind,
        }
    }

    pub const fn text(canonical: &'static str, wire: &'static str) -> Self {
        Self::new(canonical, wire, FieldKind::Text)
    }

    pub const fn flag(canonical: &'static str, wire: &'static str) -> Self {
        Self::new(canonical, wire, FieldKind::Flag)
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Returns whether callers may write this field.
    ///
    /// Ids and creation timestamps belong to the store that creates the record.
    pub fn is_writable(&self) -> bool {
        !matches!(self.kind, FieldKind::Id | FieldKind::CreatedAt)
    }

    /// Candidate keys in resolution order: wire name, canonical name, aliases.
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> {
        let aliases = self.aliases;
        [self.wire, self.canonical]
            .into_iter()
            .chain(aliases.iter().copied())
    }
}

/// Human-facing sequential number layout, e.g. `WT00000001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFormat {
    pub canonical: &'static str,
    pub wire: &'static str,
    pub prefix: &'static str,
    pub width: usize,
}

/// Static description of one entity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Short name used in logs and user messages.
    pub name: &'static str,
    /// Remote table name.
    pub table: &'static str,
    /// Local key-value storage key.
    pub storage_key: &'static str,
    pub fields: &'static [FieldMapping],
    /// Soft-disable flag toggled by `toggle_status`.
    pub status: FieldMapping,
    pub sequence: Option<SequenceFormat>,
}

impl EntitySchema {
    pub fn field(&self, canonical: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|field| field.canonical == canonical)
    }

    pub fn wire_name(&self, canonical: &str) -> Option<&'static str> {
        self.field(canonical).map(|field| field.wire)
    }

    pub fn canonical_name(&self, wire: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|field| field.wire == wire)
            .map(|field| field.canonical)
    }

    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|field| field.is_writable())
    }
}

/// A persisted record family managed by a `RecordManager`.
///
/// `Draft` is the partial input shape accepted by `save`: every field
/// optional, absent fields omitted from serialization.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Draft: Serialize + Send + Sync;

    const SCHEMA: &'static EntitySchema;

    fn id(&self) -> &str;
}
