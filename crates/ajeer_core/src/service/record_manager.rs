//! Dual-backend record manager.
//!
//! # Responsibility
//! - Route every public operation to the remote store when it is available,
//!   and to the local store otherwise.
//! - Apply the failure policy between the two stores.
//!
//! # Invariants
//! - Reads (`list_all`, `get_by_id`) never fail: a remote error is logged and
//!   the local result is returned instead.
//! - Writes (`save`, `delete`, `toggle_status`) on the remote path never fall
//!   back: the error is returned and nothing is written locally.
//! - Remote availability is decided by injected configuration, not globals.
//! - The local path is synchronous SQLite I/O run inline on the calling task.
//!   Hosts driving many concurrent tasks on a shared runtime should call the
//!   managers from `spawn_blocking` or a dedicated runtime.

use crate::diagnostics::{DiagnosticSink, LogDiagnostics, UserNotice};
use crate::model::certificate::HealthCertificate;
use crate::model::contract::Contract;
use crate::model::entity::Entity;
use crate::normalize::{record_id, CanonicalRecord};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::local_store::{LocalStore, LocalStoreError};
use crate::repo::remote_store::{RemoteError, RemoteStore, RemoteTable};
use crate::sequence::next_remote;
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type ContractManager = RecordManager<Contract>;
pub type CertificateManager = RecordManager<HealthCertificate>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Public operations, as named in logs and user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Save,
    Delete,
    ToggleStatus,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::ToggleStatus => "toggle_status",
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The remote store rejected a write; nothing was written locally.
    Remote {
        entity: &'static str,
        operation: Operation,
        source: RemoteError,
    },
    Local(LocalStoreError),
    /// The draft could not be turned into a record.
    Encode(serde_json::Error),
}

impl StoreError {
    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                entity,
                operation,
                source,
            } => match operation {
                Operation::Save => format!("Failed to save {entity}: {source}"),
                Operation::Delete => format!("Failed to delete {entity}: {source}"),
                Operation::ToggleStatus => {
                    format!("Failed to change {entity} status: {source}")
                }
                Operation::List | Operation::Get => format!("Failed to load {entity}: {source}"),
            },
            Self::Local(err) => format!("Failed to write on-device storage: {err}"),
            Self::Encode(err) => format!("Invalid record: {err}"),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote {
                entity,
                operation,
                source,
            } => write!(f, "remote {} of {entity} failed: {source}", operation.as_str()),
            Self::Local(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode record draft: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::Local(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<LocalStoreError> for StoreError {
    fn from(value: LocalStoreError) -> Self {
        Self::Local(value)
    }
}

/// Persistence façade for one entity family.
pub struct RecordManager<E: Entity> {
    local: LocalStore<E>,
    remote: Option<RemoteStore<E>>,
    remote_enabled: AtomicBool,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<E: Entity> RecordManager<E> {
    /// Creates a local-only manager.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            local: LocalStore::new(kv),
            remote: None,
            remote_enabled: AtomicBool::new(false),
            diagnostics: Arc::new(LogDiagnostics),
        }
    }

    /// Attaches a remote backend and enables it.
    pub fn with_remote(mut self, client: Arc<dyn RemoteTable>) -> Self {
        self.remote = Some(RemoteStore::new(client));
        self.remote_enabled = AtomicBool::new(true);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Switches routing at runtime. Has no effect without a remote backend.
    pub fn set_remote_enabled(&self, enabled: bool) {
        self.remote_enabled.store(enabled, Ordering::SeqCst);
        info!(
            "event=backend_switch module=manager entity={} remote_enabled={}",
            E::SCHEMA.name,
            enabled
        );
    }

    /// True when a remote backend is attached and enabled.
    pub fn is_backend_available(&self) -> bool {
        self.active_remote().is_some()
    }

    /// Direct access to the on-device store.
    pub fn local(&self) -> &LocalStore<E> {
        &self.local
    }

    fn active_remote(&self) -> Option<&RemoteStore<E>> {
        if self.remote_enabled.load(Ordering::SeqCst) {
            self.remote.as_ref()
        } else {
            None
        }
    }

    /// Every record. Remote results are newest first; local results keep
    /// stored order.
    pub async fn list_all(&self) -> Vec<E> {
        if let Some(remote) = self.active_remote() {
            match remote.list().await {
                Ok(records) => return records,
                Err(err) => self.log_degraded(Operation::List, &err),
            }
        }
        self.local.list()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<E> {
        if let Some(remote) = self.active_remote() {
            match remote.get(id).await {
                Ok(record) => return Some(record),
                Err(err) => self.log_degraded(Operation::Get, &err),
            }
        }
        self.local.get(id)
    }

    /// Creates (no id) or updates (with id) a record.
    ///
    /// # Errors
    /// - `StoreError::Remote` when the remote write fails; a user notice is
    ///   also sent to the diagnostics sink.
    /// - `StoreError::Local` when on-device storage cannot be written.
    pub async fn save(&self, draft: &E::Draft) -> StoreResult<E> {
        let canonical = draft_to_canonical(draft)?;

        let Some(remote) = self.active_remote() else {
            return Ok(self.local.save(canonical)?);
        };

        match self.save_remote(remote, canonical).await {
            Ok(record) => Ok(record),
            Err(source) => {
                let err = self.remote_failure(Operation::Save, source);
                self.diagnostics.notify(&UserNotice {
                    entity: E::SCHEMA.name,
                    operation: Operation::Save.as_str(),
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }

    async fn save_remote(
        &self,
        remote: &RemoteStore<E>,
        mut canonical: CanonicalRecord,
    ) -> Result<E, RemoteError> {
        if let Some(id) = record_id(&canonical) {
            return remote.update(&id, &canonical).await;
        }

        if let Some(format) = E::SCHEMA.sequence {
            let supplied = canonical
                .get(format.canonical)
                .and_then(Value::as_str)
                .is_some_and(|number| !number.trim().is_empty());
            if !supplied {
                let next = next_remote(remote.client(), E::SCHEMA.table, &format).await;
                canonical.insert(
                    format.canonical.to_string(),
                    Value::String(format.format(next)),
                );
            }
        }
        remote.insert(&canonical).await
    }

    /// Deletes a record. Unknown ids succeed.
    ///
    /// # Errors
    /// - `StoreError::Remote` when the remote delete fails.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        match self.active_remote() {
            Some(remote) => remote
                .delete(id)
                .await
                .map_err(|source| self.remote_failure(Operation::Delete, source)),
            None => Ok(self.local.delete(id)?),
        }
    }

    /// Sets the soft-disable flag. Returns `None` for unknown ids.
    ///
    /// # Errors
    /// - `StoreError::Remote` when the remote update fails.
    pub async fn toggle_status(&self, id: &str, disabled: bool) -> StoreResult<Option<E>> {
        match self.active_remote() {
            Some(remote) => remote
                .set_status(id, disabled)
                .await
                .map_err(|source| self.remote_failure(Operation::ToggleStatus, source)),
            None => Ok(self.local.set_status(id, disabled)?),
        }
    }

    fn log_degraded(&self, operation: Operation, err: &RemoteError) {
        warn!(
            "event=remote_read module=manager status=degraded entity={} operation={} error={}",
            E::SCHEMA.name,
            operation.as_str(),
            err
        );
    }

    fn remote_failure(&self, operation: Operation, source: RemoteError) -> StoreError {
        error!(
            "event=remote_write module=manager status=error entity={} operation={} error={}",
            E::SCHEMA.name,
            operation.as_str(),
            source
        );
        StoreError::Remote {
            entity: E::SCHEMA.name,
            operation,
            source,
        }
    }
}

fn draft_to_canonical<D: serde::Serialize>(draft: &D) -> StoreResult<CanonicalRecord> {
    match serde_json::to_value(draft).map_err(StoreError::Encode)? {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::Encode(serde::ser::Error::custom(format!(
            "draft serialized to {other}, expected an object"
        )))),
    }
}
