//! Record model for contracts and health certificates.
//!
//! # Responsibility
//! - Define the canonical (camelCase) in-memory record shapes.
//! - Define the partial draft shapes accepted by `save`.
//! - Own the wire/canonical field-mapping table of each entity family.
//!
//! # Invariants
//! - `id` is assigned exactly once, by whichever store creates the record.
//! - `createdAt` is assigned once at creation and never rewritten.

pub mod certificate;
pub mod contract;
pub mod entity;
