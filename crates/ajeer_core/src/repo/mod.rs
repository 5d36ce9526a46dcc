//! Storage adapters behind the record managers.
//!
//! # Responsibility
//! - `kv_store`: on-device key-value storage (SQLite or memory).
//! - `local_store`: one JSON array per entity family on top of `kv_store`.
//! - `remote_store`: the hosted table backend and its typed adapter.
//!
//! # Invariants
//! - A record lives in exactly one store; adapters never replicate writes.

pub mod kv_store;
pub mod local_store;
pub mod remote_store;
