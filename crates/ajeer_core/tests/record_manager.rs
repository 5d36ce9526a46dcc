mod common;

use ajeer_core::{
    CertificateDraft, CertificateManager, ContractDraft, ContractManager, MemoryKeyValueStore,
    Operation, StoreError, DEFAULT_CONTRACT_TYPE,
};
use common::{CollectingDiagnostics, FakeRemote};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    remote: Arc<FakeRemote>,
    diagnostics: Arc<CollectingDiagnostics>,
    contracts: ContractManager,
}

fn remote_harness() -> Harness {
    let remote = Arc::new(FakeRemote::new());
    let diagnostics = Arc::new(CollectingDiagnostics::default());
    let contracts = ContractManager::new(Arc::new(MemoryKeyValueStore::new()))
        .with_remote(remote.clone())
        .with_diagnostics(diagnostics.clone());
    Harness {
        remote,
        diagnostics,
        contracts,
    }
}

fn named(name: &str) -> ContractDraft {
    ContractDraft {
        worker_name: Some(name.to_string()),
        ..ContractDraft::default()
    }
}

#[tokio::test]
async fn local_only_manager_serves_every_operation_from_device_storage() {
    let contracts = ContractManager::new(Arc::new(MemoryKeyValueStore::new()));
    assert!(!contracts.is_backend_available());

    let first = contracts.save(&named("Ali")).await.unwrap();
    let second = contracts.save(&named("Omar")).await.unwrap();
    assert_eq!(first.contract_number.as_deref(), Some("WT00000001"));
    assert_eq!(second.contract_number.as_deref(), Some("WT00000002"));

    let listed = contracts.list_all().await;
    assert_eq!(listed, vec![first.clone(), second.clone()]);
    assert_eq!(contracts.get_by_id(&first.id).await, Some(first.clone()));

    let blocked = contracts.toggle_status(&first.id, true).await.unwrap();
    assert!(blocked.unwrap().is_blocked);
    assert_eq!(contracts.toggle_status("missing", true).await.unwrap(), None);

    contracts.delete(&first.id).await.unwrap();
    contracts.delete("missing").await.unwrap();
    assert_eq!(contracts.list_all().await, vec![second]);
}

#[tokio::test]
async fn reads_degrade_to_local_records_when_remote_fails() {
    let h = remote_harness();
    let local = h
        .contracts
        .local()
        .save(serde_json::from_value(json!({"workerName": "Ali"})).unwrap())
        .unwrap();
    h.remote.fail_reads(true);

    assert_eq!(h.contracts.list_all().await, vec![local.clone()]);
    assert_eq!(h.contracts.get_by_id(&local.id).await, Some(local));
    assert!(h.diagnostics.notices().is_empty());
}

#[tokio::test]
async fn remote_get_miss_falls_back_to_local_lookup() {
    let h = remote_harness();
    h.remote.seed("contracts", json!({"worker_name": "remote only"}));
    let local = h
        .contracts
        .local()
        .save(serde_json::from_value(json!({"id": "offline-1", "workerName": "Ali"})).unwrap())
        .unwrap();

    assert_eq!(h.contracts.get_by_id("offline-1").await, Some(local));
    assert_eq!(h.contracts.get_by_id("nowhere").await, None);
}

#[tokio::test]
async fn failed_remote_save_is_reported_and_never_written_locally() {
    let h = remote_harness();
    h.remote.fail_writes(true);

    let err = h.contracts.save(&named("Ali")).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Remote {
            entity: "contract",
            operation: Operation::Save,
            ..
        }
    ));
    assert!(err.user_message().starts_with("Failed to save contract"));
    assert!(h.contracts.local().list().is_empty());

    let notices = h.diagnostics.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].entity, "contract");
    assert_eq!(notices[0].operation, "save");
    assert_eq!(notices[0].message, err.user_message());
}

#[tokio::test]
async fn remote_create_numbers_from_latest_remote_row() {
    let h = remote_harness();
    h.remote
        .seed("contracts", json!({"contract_number": "WT00000041"}));

    let saved = h.contracts.save(&named("Ali")).await.unwrap();
    assert_eq!(saved.contract_number.as_deref(), Some("WT00000042"));
    assert_eq!(saved.id, "remote-2");
    assert_eq!(saved.contract_type, DEFAULT_CONTRACT_TYPE);
    assert!(saved.created_at.is_some());
    assert_eq!(
        h.remote.calls(),
        vec!["select contracts".to_string(), "insert contracts".to_string()]
    );

    let rows = h.remote.rows("contracts");
    let stored = rows.iter().find(|row| row["id"] == json!("remote-2")).unwrap();
    assert_eq!(stored["worker_name"], json!("Ali"));
    assert_eq!(stored["is_blocked"], json!(false));
    assert!(!stored.contains_key("workerName"));
    assert!(h.contracts.local().list().is_empty());
}

#[tokio::test]
async fn remote_create_falls_back_to_timestamp_number_when_lookup_fails() {
    let h = remote_harness();
    h.remote.fail_reads(true);

    let saved = h.contracts.save(&named("Ali")).await.unwrap();
    let number = saved.contract_number.unwrap();
    assert!(number.starts_with("WT"));
    assert!(number.len() > "WT00000001".len());
}

#[tokio::test]
async fn remote_update_sends_only_supplied_fields() {
    let h = remote_harness();
    let id = h.remote.seed(
        "contracts",
        json!({"worker_name": "Ali", "end_date": "2026-06-30", "contract_number": "WT00000003"}),
    );

    let updated = h
        .contracts
        .save(&ContractDraft {
            id: Some(id.clone()),
            end_date: Some("2027-06-30".to_string()),
            ..ContractDraft::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.id, id);
    assert_eq!(updated.worker_name.as_deref(), Some("Ali"));
    assert_eq!(updated.end_date.as_deref(), Some("2027-06-30"));
    assert_eq!(updated.contract_number.as_deref(), Some("WT00000003"));
    assert_eq!(h.remote.calls(), vec![format!("update contracts {id}")]);
}

#[tokio::test]
async fn remote_update_of_unknown_id_is_an_error() {
    let h = remote_harness();

    let err = h
        .contracts
        .save(&ContractDraft {
            id: Some("missing".to_string()),
            ..named("Ali")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Remote { operation: Operation::Save, .. }));
    assert!(h.contracts.local().list().is_empty());
}

#[tokio::test]
async fn remote_list_is_newest_first() {
    let h = remote_harness();
    let older = h.remote.seed("contracts", json!({"worker_name": "older"}));
    let newer = h.remote.seed("contracts", json!({"worker_name": "newer"}));

    let ids: Vec<String> = h
        .contracts
        .list_all()
        .await
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![newer, older]);
}

#[tokio::test]
async fn remote_toggle_and_delete() {
    let h = remote_harness();
    let id = h.remote.seed("contracts", json!({"worker_name": "Ali"}));

    let blocked = h.contracts.toggle_status(&id, true).await.unwrap().unwrap();
    assert!(blocked.is_blocked);
    assert_eq!(h.remote.rows("contracts")[0]["is_blocked"], json!(true));
    assert_eq!(h.contracts.toggle_status("missing", true).await.unwrap(), None);

    h.contracts.delete(&id).await.unwrap();
    h.contracts.delete("missing").await.unwrap();
    assert!(h.remote.rows("contracts").is_empty());
}

#[tokio::test]
async fn remote_delete_and_toggle_failures_propagate_without_local_writes() {
    let h = remote_harness();
    let local = h
        .contracts
        .local()
        .save(serde_json::from_value(json!({"id": "c-1"})).unwrap())
        .unwrap();
    h.remote.fail_writes(true);

    let err = h.contracts.delete(&local.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Remote { operation: Operation::Delete, .. }));

    let err = h.contracts.toggle_status(&local.id, true).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Remote {
            operation: Operation::ToggleStatus,
            ..
        }
    ));

    assert_eq!(h.contracts.local().list(), vec![local]);
}

#[tokio::test]
async fn disabling_remote_routes_everything_locally() {
    let h = remote_harness();
    assert!(h.contracts.is_backend_available());

    h.contracts.set_remote_enabled(false);
    assert!(!h.contracts.is_backend_available());

    let saved = h.contracts.save(&named("Ali")).await.unwrap();
    assert_eq!(saved.contract_number.as_deref(), Some("WT00000001"));
    assert_eq!(h.contracts.list_all().await, vec![saved]);
    assert!(h.remote.calls().is_empty());

    h.contracts.set_remote_enabled(true);
    assert!(h.contracts.list_all().await.is_empty());
}

#[tokio::test]
async fn certificates_use_their_own_table_and_status_flag() {
    let remote = Arc::new(FakeRemote::new());
    let certificates =
        CertificateManager::new(Arc::new(MemoryKeyValueStore::new())).with_remote(remote.clone());

    let saved = certificates
        .save(&CertificateDraft {
            holder_name: Some("Ali".to_string()),
            holder_id: Some("1098".to_string()),
            ..CertificateDraft::default()
        })
        .await
        .unwrap();
    assert!(!saved.is_disabled);
    assert_eq!(remote.calls(), vec!["insert health_certificates".to_string()]);
    assert_eq!(remote.rows("health_certificates")[0]["holder_id"], json!("1098"));

    let disabled = certificates
        .toggle_status(&saved.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(disabled.is_disabled);
    assert_eq!(
        remote.rows("health_certificates")[0]["is_disabled"],
        json!(true)
    );
}
