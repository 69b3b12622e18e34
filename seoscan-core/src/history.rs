use crate::analyze::AnalysisData;
use chrono::{DateTime, Utc};
use seoscan_scanner::DebugInfo;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Running,
    Complete,
    Failed,
}

/// One stored analysis run. `results` holds the serialized payload once
/// the run terminates.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub status: RecordStatus,
    pub results: Option<String>,
}

/// The external persistence collaborator. The analysis driver creates a
/// record before crawling and updates it exactly once on termination.
pub trait HistoryStore: Send + Sync {
    fn create_record(&self, url: &str) -> String;
    fn mark_complete(&self, id: &str, data: &AnalysisData);
    fn mark_failed(&self, id: &str, error: &str, debug_info: &DebugInfo);
    fn get_record(&self, id: &str) -> Option<HistoryRecord>;
}

/// In-memory store backing the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<HashMap<String, HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, newest last. Not part of the store contract; the CLI
    /// and tests use it to inspect the single run they drive.
    pub fn records(&self) -> Vec<HistoryRecord> {
        let mut records: Vec<HistoryRecord> =
            self.records.lock().unwrap().values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    fn update(&self, id: &str, status: RecordStatus, results: Option<String>) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(id) {
            record.status = status;
            record.results = results;
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn create_record(&self, url: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let record = HistoryRecord {
            id: id.clone(),
            url: url.to_string(),
            created_at: Utc::now(),
            status: RecordStatus::Running,
            results: None,
        };
        self.records.lock().unwrap().insert(id.clone(), record);
        id
    }

    fn mark_complete(&self, id: &str, data: &AnalysisData) {
        let payload = serialize_for_storage(data).ok();
        self.update(id, RecordStatus::Complete, payload);
    }

    fn mark_failed(&self, id: &str, error: &str, debug_info: &DebugInfo) {
        let payload = serialize_for_storage(&serde_json::json!({
            "error": error,
            "debugInfo": debug_info,
        }))
        .ok();
        self.update(id, RecordStatus::Failed, payload);
    }

    fn get_record(&self, id: &str) -> Option<HistoryRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

/// The storage layer keeps every numeric field as a string.
pub fn serialize_for_storage<T: Serialize>(data: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(data)?;
    serde_json::to_string(&coerce_numbers_to_strings(value))
}

fn coerce_numbers_to_strings(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(coerce_numbers_to_strings)
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, coerce_numbers_to_strings(value)))
                .collect(),
        ),
        other => other,
    }
}
