use crate::debug::DebugInfo;
use crate::result::AnalysisResult;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Starting,
    Analyzing,
    Complete,
}

/// Per-batch progress. `current` never decreases within one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub total: usize,
    pub current: usize,
    pub status: CrawlStatus,
}

/// Everything the consuming channel can receive. A crawl terminates with
/// exactly one `complete` or `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CrawlEvent {
    Progress {
        total: usize,
        current: usize,
        status: CrawlStatus,
    },
    Complete {
        results: Vec<AnalysisResult>,
        #[serde(rename = "debugInfo")]
        debug_info: DebugInfo,
    },
    Error {
        error: String,
        #[serde(rename = "debugInfo")]
        debug_info: DebugInfo,
    },
}

impl From<ProgressEvent> for CrawlEvent {
    fn from(event: ProgressEvent) -> Self {
        CrawlEvent::Progress {
            total: event.total,
            current: event.current,
            status: event.status,
        }
    }
}

/// Render an event as a server-sent-events frame.
pub fn encode_sse(event: &CrawlEvent) -> String {
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("data: {json}\n\n")
}

/// Sending half of the crawl's event channel. Emitting into a closed
/// channel drops the event; a disconnected consumer never fails a crawl.
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    tx: mpsc::UnboundedSender<CrawlEvent>,
}

impl ProgressEmitter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: CrawlEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event channel closed, dropping event");
        }
    }

    pub fn progress(&self, event: ProgressEvent) {
        self.emit(CrawlEvent::from(event));
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{PageMetadata, TechnicalSpecs};

    #[test]
    fn test_encode_sse_progress() {
        let event = CrawlEvent::Progress {
            total: 12,
            current: 5,
            status: CrawlStatus::Analyzing,
        };

        let frame = encode_sse(&event);
        assert!(frame.starts_with("data: "));
        assert!(frame.ends_with("\n\n"));

        let json: serde_json::Value =
            serde_json::from_str(frame.trim_start_matches("data: ").trim()).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["total"], 12);
        assert_eq!(json["current"], 5);
        assert_eq!(json["status"], "analyzing");
    }

    #[test]
    fn test_complete_event_round_trip() {
        let result = AnalysisResult::from_page(
            "https://example.com/".to_string(),
            PageMetadata {
                title: "Home".to_string(),
                ..Default::default()
            },
            TechnicalSpecs {
                load_speed_ms: 87,
                page_size_bytes: 2048,
            },
        );

        let event = CrawlEvent::Complete {
            results: vec![result],
            debug_info: DebugInfo::default(),
        };

        let frame = encode_sse(&event);
        let payload = frame.trim_start_matches("data: ").trim();
        let parsed: CrawlEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_round_trip_survives_string_coercion() {
        // The persistence boundary stores numerics as strings; parsing
        // such a payload back must yield the same event.
        let result = AnalysisResult::from_page(
            "https://example.com/".to_string(),
            PageMetadata::default(),
            TechnicalSpecs {
                load_speed_ms: 87,
                page_size_bytes: 2048,
            },
        );
        let event = CrawlEvent::Complete {
            results: vec![result],
            debug_info: DebugInfo::default(),
        };

        let mut value = serde_json::to_value(&event).unwrap();
        let specs = &mut value["results"][0]["technicalSpecs"];
        specs["loadSpeedMs"] = serde_json::Value::String("87".to_string());
        specs["pageSizeBytes"] = serde_json::Value::String("2048".to_string());

        let parsed: CrawlEvent = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, event);
    }

    #[tokio::test]
    async fn test_emit_after_consumer_dropped_is_noop() {
        let (emitter, rx) = ProgressEmitter::channel();
        drop(rx);

        assert!(emitter.is_closed());
        // Must not panic or error.
        emitter.progress(ProgressEvent {
            total: 1,
            current: 1,
            status: CrawlStatus::Complete,
        });
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (emitter, mut rx) = ProgressEmitter::channel();

        for current in [5, 10, 12] {
            emitter.progress(ProgressEvent {
                total: 12,
                current,
                status: CrawlStatus::Analyzing,
            });
        }
        drop(emitter);

        let mut currents = Vec::new();
        while let Some(CrawlEvent::Progress { current, .. }) = rx.recv().await {
            currents.push(current);
        }
        assert_eq!(currents, vec![5, 10, 12]);
    }
}
