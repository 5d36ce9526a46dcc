#![allow(dead_code)]

use ajeer_core::{
    DiagnosticSink, RemoteError, RemoteResult, RemoteTable, SelectQuery, UserNotice,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory table backend that behaves like the hosted one.
///
/// Ids are `remote-<n>`; `created_at` grows with every insert so that
/// descending order is insertion order reversed.
#[derive(Default)]
pub struct FakeRemote {
    tables: Mutex<HashMap<String, Vec<Map<String, Value>>>>,
    counter: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inserts a wire-shaped row directly, bypassing failure switches.
    pub fn seed(&self, table: &str, row: Value) -> String {
        let Value::Object(mut row) = row else {
            panic!("seed rows must be objects");
        };
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("remote-{n}");
        row.entry("id").or_insert_with(|| json!(id.clone()));
        row.entry("created_at")
            .or_insert_with(|| json!(format!("2026-01-01T00:00:00.{n:06}Z")));
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
        id
    }

    pub fn rows(&self, table: &str) -> Vec<Map<String, Value>> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_reads(&self) -> RemoteResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 503,
                body: "read unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn check_writes(&self) -> RemoteResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 503,
                body: "write unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn row_id(row: &Map<String, Value>) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RemoteTable for FakeRemote {
    async fn select(&self, table: &str, query: &SelectQuery) -> RemoteResult<Vec<Value>> {
        self.record_call(format!("select {table}"));
        self.check_reads()?;

        let mut rows: Vec<Map<String, Value>> = self
            .rows(table)
            .into_iter()
            .filter(|row| query.id.as_deref().map_or(true, |id| row_id(row) == Some(id)))
            .collect();

        if let Some(column) = &query.order_desc {
            rows.sort_by(|a, b| {
                let key = |row: &Map<String, Value>| {
                    row.get(column).and_then(Value::as_str).unwrap_or("").to_string()
                };
                key(b).cmp(&key(a))
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows
            .into_iter()
            .map(|row| match &query.columns {
                Some(columns) => Value::Object(
                    row.into_iter()
                        .filter(|(key, _)| columns.contains(key))
                        .collect(),
                ),
                None => Value::Object(row),
            })
            .collect())
    }

    async fn insert(&self, table: &str, row: &Map<String, Value>) -> RemoteResult<Value> {
        self.record_call(format!("insert {table}"));
        self.check_writes()?;
        let id = self.seed(table, Value::Object(row.clone()));
        Ok(Value::Object(
            self.rows(table)
                .into_iter()
                .find(|row| row_id(row) == Some(id.as_str()))
                .unwrap(),
        ))
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> RemoteResult<Vec<Value>> {
        self.record_call(format!("update {table} {id}"));
        self.check_writes()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        Ok(rows
            .iter_mut()
            .filter(|row| row_id(row) == Some(id))
            .map(|row| {
                row.extend(patch.clone());
                Value::Object(row.clone())
            })
            .collect())
    }

    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()> {
        self.record_call(format!("delete {table} {id}"));
        self.check_writes()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| row_id(row) != Some(id));
        }
        Ok(())
    }
}

/// Diagnostics sink that remembers every notice.
#[derive(Default)]
pub struct CollectingDiagnostics {
    notices: Mutex<Vec<UserNotice>>,
}

impl CollectingDiagnostics {
    pub fn notices(&self) -> Vec<UserNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn notify(&self, notice: &UserNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
