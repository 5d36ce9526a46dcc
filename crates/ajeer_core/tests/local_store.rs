use ajeer_core::normalize::CanonicalRecord;
use ajeer_core::{
    Contract, ContractDraft, HealthCertificate, KeyValueStore, LocalStore, MemoryKeyValueStore,
    SqliteKeyValueStore, DEFAULT_CONTRACT_TYPE,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn canonical(value: Value) -> CanonicalRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn draft(draft: &ContractDraft) -> CanonicalRecord {
    canonical(serde_json::to_value(draft).unwrap())
}

fn memory_store() -> (Arc<MemoryKeyValueStore>, LocalStore<Contract>) {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let store = LocalStore::new(kv.clone());
    (kv, store)
}

#[test]
fn new_records_get_ids_timestamps_and_consecutive_numbers() {
    let (_, store) = memory_store();

    let first = store
        .save(draft(&ContractDraft {
            worker_name: Some("Ali".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();
    let second = store
        .save(draft(&ContractDraft {
            worker_name: Some("Omar".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();

    assert_eq!(first.contract_number.as_deref(), Some("WT00000001"));
    assert_eq!(second.contract_number.as_deref(), Some("WT00000002"));
    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);
    assert!(first.created_at.is_some());
    assert_eq!(first.contract_type, DEFAULT_CONTRACT_TYPE);
    assert!(!first.is_blocked);

    let listed: Vec<String> = store.list().into_iter().map(|record| record.id).collect();
    assert_eq!(listed, vec![first.id.clone(), second.id.clone()]);
}

#[test]
fn saved_record_reads_back_equal() {
    let (_, store) = memory_store();
    let saved = store
        .save(draft(&ContractDraft {
            worker_name: Some("Ali".to_string()),
            start_date: Some("2026-01-01".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();

    assert_eq!(store.get(&saved.id), Some(saved));
}

#[test]
fn supplied_number_is_kept() {
    let (_, store) = memory_store();
    let saved = store
        .save(draft(&ContractDraft {
            contract_number: Some("WT00000120".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();
    assert_eq!(saved.contract_number.as_deref(), Some("WT00000120"));

    let next = store.save(draft(&ContractDraft::default())).unwrap();
    assert_eq!(next.contract_number.as_deref(), Some("WT00000121"));
}

#[test]
fn update_merges_supplied_fields_and_keeps_the_rest() {
    let (_, store) = memory_store();
    let saved = store
        .save(draft(&ContractDraft {
            worker_name: Some("Ali".to_string()),
            end_date: Some("2026-06-30".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();

    let updated = store
        .save(draft(&ContractDraft {
            id: Some(saved.id.clone()),
            end_date: Some("2027-06-30".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.worker_name.as_deref(), Some("Ali"));
    assert_eq!(updated.end_date.as_deref(), Some("2027-06-30"));
    assert_eq!(updated.contract_number, saved.contract_number);
    assert_eq!(updated.created_at, saved.created_at);
    assert_eq!(store.list().len(), 1);
}

#[test]
fn unknown_id_is_appended_as_new_record() {
    let (_, store) = memory_store();
    store.save(draft(&ContractDraft::default())).unwrap();

    let foreign = store
        .save(draft(&ContractDraft {
            id: Some("imported-7".to_string()),
            worker_name: Some("Sami".to_string()),
            ..ContractDraft::default()
        }))
        .unwrap();

    assert_eq!(foreign.id, "imported-7");
    assert_eq!(foreign.contract_number.as_deref(), Some("WT00000002"));
    assert!(foreign.created_at.is_some());
    assert_eq!(store.list().len(), 2);
    assert_eq!(store.get("imported-7"), Some(foreign));
}

#[test]
fn delete_removes_matching_record_and_ignores_unknown_ids() {
    let (kv, store) = memory_store();
    let keep = store.save(draft(&ContractDraft::default())).unwrap();
    let gone = store.save(draft(&ContractDraft::default())).unwrap();

    store.delete(&gone.id).unwrap();
    assert_eq!(store.get(&gone.id), None);
    assert_eq!(store.get(&keep.id), Some(keep));

    let before = kv.get("ajeer_contracts").unwrap();
    store.delete("missing").unwrap();
    assert_eq!(kv.get("ajeer_contracts").unwrap(), before);
}

#[test]
fn toggle_sets_flag_and_returns_none_for_unknown_ids() {
    let (_, store) = memory_store();
    let saved = store.save(draft(&ContractDraft::default())).unwrap();

    let blocked = store.set_status(&saved.id, true).unwrap().unwrap();
    assert!(blocked.is_blocked);
    assert!(store.get(&saved.id).unwrap().is_blocked);

    let unblocked = store.set_status(&saved.id, false).unwrap().unwrap();
    assert!(!unblocked.is_blocked);

    assert_eq!(store.set_status("missing", true).unwrap(), None);
}

#[test]
fn corrupt_storage_reads_as_empty_and_is_replaced_on_write() {
    let (kv, store) = memory_store();
    kv.set("ajeer_contracts", "{not json").unwrap();

    assert!(store.list().is_empty());
    assert_eq!(store.get("anything"), None);

    let saved = store.save(draft(&ContractDraft::default())).unwrap();
    assert_eq!(saved.contract_number.as_deref(), Some("WT00000001"));
    assert_eq!(store.list(), vec![saved]);
}

#[test]
fn legacy_wire_shaped_entries_are_read_canonically() {
    let (kv, store) = memory_store();
    kv.set(
        "ajeer_contracts",
        &json!([
            {"id": "old-1", "worker_name": "Ali", "is_blocked": "true", "contract_number": "WT00000005"},
            "not a record"
        ])
        .to_string(),
    )
    .unwrap();

    let records = store.list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].worker_name.as_deref(), Some("Ali"));
    assert!(records[0].is_blocked);

    let next = store.save(draft(&ContractDraft::default())).unwrap();
    assert_eq!(next.contract_number.as_deref(), Some("WT00000006"));
}

#[test]
fn families_use_separate_storage_keys() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let contracts: LocalStore<Contract> = LocalStore::new(kv.clone());
    let certificates: LocalStore<HealthCertificate> = LocalStore::new(kv.clone());

    contracts.save(draft(&ContractDraft::default())).unwrap();
    let certificate = certificates
        .save(canonical(json!({"holderName": "Ali"})))
        .unwrap();

    assert_eq!(contracts.list().len(), 1);
    assert_eq!(certificates.list(), vec![certificate]);
    assert!(kv.get("ajeer_health_certs").unwrap().is_some());
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ajeer_local.sqlite3");

    let saved = {
        let store: LocalStore<Contract> =
            LocalStore::new(Arc::new(SqliteKeyValueStore::open(&path).unwrap()));
        store
            .save(draft(&ContractDraft {
                worker_name: Some("Ali".to_string()),
                ..ContractDraft::default()
            }))
            .unwrap()
    };

    let reopened: LocalStore<Contract> =
        LocalStore::new(Arc::new(SqliteKeyValueStore::open(&path).unwrap()));
    assert_eq!(reopened.get(&saved.id), Some(saved));
}
