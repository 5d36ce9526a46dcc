//! Persistence core for Ajeer contracts and health certificates.
//!
//! Records live in a hosted table backend when it is reachable and in
//! on-device storage otherwise. Callers use one `RecordManager` per entity
//! family and never see which store answered.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod id;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod sequence;
pub mod service;

pub use bootstrap::{open_stores, BackendMode, BootstrapError, Stores};
pub use config::{ConfigError, StorageConfig};
pub use diagnostics::{DiagnosticSink, LogDiagnostics, UserNotice};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::certificate::{CertificateDraft, HealthCertificate};
pub use model::contract::{Contract, ContractDraft, DEFAULT_CONTRACT_TYPE};
pub use model::entity::{Entity, EntitySchema, FieldKind, FieldMapping, SequenceFormat};
pub use repo::kv_store::{KeyValueStore, KvError, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::local_store::{LocalStore, LocalStoreError};
pub use repo::remote_store::{RemoteError, RemoteResult, RemoteTable, RestTableClient, SelectQuery};
pub use service::record_manager::{
    CertificateManager, ContractManager, Operation, RecordManager, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
