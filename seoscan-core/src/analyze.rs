use crate::history::HistoryStore;
use seoscan_scanner::{
    AnalysisResult, BatchScheduler, CrawlEvent, CrawlStatus, DebugInfo, DebugLog, PageFetcher,
    ProgressCallback, ProgressEmitter, ProgressEvent, ScanConfig, SitemapExpander, TotalPolicy,
    dedupe_urls,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use url::Url;

/// Options for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub sitemap_url: String,
    pub config: ScanConfig,
}

impl AnalyzeOptions {
    pub fn new(sitemap_url: impl Into<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            config: ScanConfig::default(),
        }
    }
}

/// Final aggregated payload handed to the persistence collaborator and
/// carried by the terminal `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub urls_analyzed: usize,
    pub issues: usize,
    pub details: Vec<AnalysisResult>,
    pub debug_info: DebugInfo,
}

/// Run the full pipeline: expand the sitemap, dedupe, fetch in batches,
/// aggregate, persist, and emit events. The event channel always receives
/// exactly one terminal `complete` or `error` event. Per-URL failures are
/// downgraded to placeholders; only crawl-level conditions return `Err`.
pub async fn execute_analysis(
    options: AnalyzeOptions,
    emitter: ProgressEmitter,
    store: Arc<dyn HistoryStore>,
) -> Result<AnalysisData, String> {
    let started = Instant::now();
    let debug = DebugLog::new();

    // The history record exists before any network traffic.
    let record_id = store.create_record(&options.sitemap_url);

    let valid_input = matches!(
        Url::parse(&options.sitemap_url),
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https"
    );
    if !valid_input {
        let message = format!("Invalid sitemap URL: {}", options.sitemap_url);
        return fail(&emitter, store.as_ref(), &record_id, message, &debug, started).await;
    }

    let client = match options.config.build_client() {
        Ok(client) => client,
        Err(error) => {
            let message = format!("Failed to create HTTP client: {error}");
            return fail(&emitter, store.as_ref(), &record_id, message, &debug, started).await;
        }
    };

    info!("Analyzing sitemap {}", options.sitemap_url);

    let mut expander = SitemapExpander::new(client.clone(), &options.config, debug.clone());
    if options.config.total_policy == TotalPolicy::Incremental {
        let discovery_emitter = emitter.clone();
        expander = expander.with_discovery_callback(Arc::new(move |total| {
            discovery_emitter.progress(ProgressEvent {
                total,
                current: 0,
                status: CrawlStatus::Starting,
            });
        }));
    }

    let expanded = expander.expand(&options.sitemap_url).await;
    let unique_urls = dedupe_urls(expanded, &debug).await;

    if unique_urls.is_empty() {
        let message = format!("No URLs found in sitemap {}", options.sitemap_url);
        return fail(&emitter, store.as_ref(), &record_id, message, &debug, started).await;
    }

    emitter.progress(ProgressEvent {
        total: unique_urls.len(),
        current: 0,
        status: CrawlStatus::Starting,
    });

    let fetcher = PageFetcher::new(client, debug.clone());
    let scheduler = BatchScheduler::new(fetcher, options.config.clone(), debug.clone());

    let progress_emitter = emitter.clone();
    let on_progress: ProgressCallback = Arc::new(move |event| progress_emitter.progress(event));

    let details = scheduler.run(&unique_urls, Some(on_progress)).await;

    let issues = details.iter().map(|r| r.issues.len()).sum();
    let debug_info = debug.finish(started.elapsed().as_millis() as u64).await;

    let data = AnalysisData {
        urls_analyzed: details.len(),
        issues,
        details,
        debug_info,
    };

    store.mark_complete(&record_id, &data);
    emitter.emit(CrawlEvent::Complete {
        results: data.details.clone(),
        debug_info: data.debug_info.clone(),
    });

    info!(
        "Analysis complete: {} URLs, {} issues",
        data.urls_analyzed, data.issues
    );

    Ok(data)
}

async fn fail(
    emitter: &ProgressEmitter,
    store: &dyn HistoryStore,
    record_id: &str,
    message: String,
    debug: &DebugLog,
    started: Instant,
) -> Result<AnalysisData, String> {
    let snapshot: DebugInfo = debug.finish(started.elapsed().as_millis() as u64).await;

    store.mark_failed(record_id, &message, &snapshot);
    emitter.emit(CrawlEvent::Error {
        error: message.clone(),
        debug_info: snapshot,
    });

    Err(message)
}
