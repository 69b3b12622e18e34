use crate::result::{u16_or_string, u64_or_string};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One line of the per-request log kept for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    pub url: String,
    #[serde(deserialize_with = "u16_or_string")]
    pub status: u16,
    #[serde(deserialize_with = "u64_or_string")]
    pub duration_ms: u64,
}

/// Crawl-wide diagnostic accumulator. Created at crawl start, appended to
/// by every component, serialized into the final payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugInfo {
    pub xml_parsing_status: String,
    pub network_errors: Vec<String>,
    pub parsing_errors: Vec<String>,
    pub rate_limiting_issues: Vec<String>,
    pub request_logs: Vec<RequestLog>,
    #[serde(deserialize_with = "u64_or_string")]
    pub processing_time_ms: u64,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            xml_parsing_status: "pending".to_string(),
            network_errors: Vec::new(),
            parsing_errors: Vec::new(),
            rate_limiting_issues: Vec::new(),
            request_logs: Vec::new(),
            processing_time_ms: 0,
        }
    }
}

/// Shared handle to the crawl's [`DebugInfo`]. Fetches within a batch run
/// concurrently, so every append goes through the mutex.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    inner: Arc<Mutex<DebugInfo>>,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn network_error(&self, message: impl Into<String>) {
        self.inner.lock().await.network_errors.push(message.into());
    }

    pub async fn parsing_error(&self, message: impl Into<String>) {
        self.inner.lock().await.parsing_errors.push(message.into());
    }

    pub async fn rate_limit(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .await
            .rate_limiting_issues
            .push(message.into());
    }

    pub async fn request_log(&self, url: &str, status: u16, duration_ms: u64) {
        self.inner.lock().await.request_logs.push(RequestLog {
            url: url.to_string(),
            status,
            duration_ms,
        });
    }

    pub async fn set_xml_status(&self, status: &str) {
        self.inner.lock().await.xml_parsing_status = status.to_string();
    }

    pub async fn snapshot(&self) -> DebugInfo {
        self.inner.lock().await.clone()
    }

    /// Stamp the total processing time and return the final snapshot.
    pub async fn finish(&self, processing_time_ms: u64) -> DebugInfo {
        let mut info = self.inner.lock().await;
        info.processing_time_ms = processing_time_ms;
        info.clone()
    }
}
