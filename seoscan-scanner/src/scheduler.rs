use crate::config::ScanConfig;
use crate::debug::DebugLog;
use crate::error::ScanError;
use crate::fetch::PageFetcher;
use crate::progress::{CrawlStatus, ProgressEvent};
use crate::result::AnalysisResult;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

const DELAY_DECREASE_MS: u64 = 50;
const DELAY_INCREASE_MS: u64 = 100;

/// Adaptive inter-batch delay in milliseconds. Updated by every
/// completing fetch; last-writer-wins, clamped on every store so
/// concurrent updates can never push it out of range.
pub struct AdaptiveDelay {
    millis: AtomicU64,
    min: u64,
    max: u64,
}

impl AdaptiveDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.as_millis() as u64;
        let max = (max.as_millis() as u64).max(min);
        Self {
            millis: AtomicU64::new(min),
            min,
            max,
        }
    }

    pub fn current(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Relaxed))
    }

    /// Fast, clean fetch: back the delay off toward the minimum.
    pub fn speed_up(&self) {
        let current = self.millis.load(Ordering::Relaxed);
        self.store_clamped(current.saturating_sub(DELAY_DECREASE_MS));
    }

    /// Any failure: give the host more breathing room.
    pub fn slow_down(&self) {
        let current = self.millis.load(Ordering::Relaxed);
        self.store_clamped(current.saturating_add(DELAY_INCREASE_MS));
    }

    /// Explicit rate limiting: double the delay.
    pub fn double(&self) {
        let current = self.millis.load(Ordering::Relaxed);
        self.store_clamped(current.saturating_mul(2));
    }

    fn store_clamped(&self, value: u64) {
        self.millis
            .store(value.clamp(self.min, self.max), Ordering::Relaxed);
    }
}

/// Per-URL retry state. Lives only for the duration of that URL's
/// processing within one batch.
#[derive(Debug, Default)]
struct FetchAttempt {
    retries: u32,
    succeeded: bool,
    last_error: Option<ScanError>,
}

/// Runs fetches in fixed-size concurrent batches with bounded retries
/// and adaptive pacing, reporting progress after each batch.
pub struct BatchScheduler {
    fetcher: PageFetcher,
    config: ScanConfig,
    debug: DebugLog,
    delay: AdaptiveDelay,
}

impl BatchScheduler {
    pub fn new(fetcher: PageFetcher, config: ScanConfig, debug: DebugLog) -> Self {
        let delay = AdaptiveDelay::new(config.min_delay, config.max_delay);
        Self {
            fetcher,
            config,
            debug,
            delay,
        }
    }

    /// Process every URL, batch by batch. A URL that exhausts its retries
    /// becomes an error placeholder; it never aborts the run.
    pub async fn run(
        &self,
        urls: &[String],
        on_progress: Option<ProgressCallback>,
    ) -> Vec<AnalysisResult> {
        let total = urls.len();
        let mut results = Vec::with_capacity(total);
        let mut processed = 0usize;

        let batches: Vec<&[String]> = urls.chunks(self.config.concurrency).collect();
        let last_batch = batches.len().saturating_sub(1);

        for (index, batch) in batches.iter().enumerate() {
            debug!(
                "Dispatching batch {}/{} ({} URLs)",
                index + 1,
                batches.len(),
                batch.len()
            );

            let outcomes = join_all(batch.iter().map(|url| self.process_url(url))).await;
            results.extend(outcomes);
            processed += batch.len();

            if let Some(ref callback) = on_progress {
                callback(ProgressEvent {
                    total,
                    current: processed,
                    status: if index == last_batch {
                        CrawlStatus::Complete
                    } else {
                        CrawlStatus::Analyzing
                    },
                });
            }

            if index != last_batch {
                tokio::time::sleep(self.delay.current()).await;
            }
        }

        results
    }

    async fn process_url(&self, url: &str) -> AnalysisResult {
        let mut attempt = FetchAttempt::default();
        let mut result = None;

        while !attempt.succeeded && attempt.retries < self.config.max_retries {
            match self.fetcher.fetch(url).await {
                Ok(analysis) => {
                    attempt.succeeded = true;
                    if attempt.retries == 0 {
                        self.delay.speed_up();
                    }
                    result = Some(analysis);
                }
                Err(error) => {
                    attempt.retries += 1;

                    match &error {
                        ScanError::RateLimited(_) => {
                            self.debug
                                .rate_limit(format!("Rate limit hit for {url}"))
                                .await;
                            self.delay.double();
                            tokio::time::sleep(self.config.rate_limit_cooldown).await;
                        }
                        ScanError::Timeout(_) => {
                            self.debug.network_error(format!("Timeout for {url}")).await;
                            self.delay.slow_down();
                        }
                        other => {
                            self.debug
                                .network_error(format!("Error fetching {url}: {other}"))
                                .await;
                            self.delay.slow_down();
                        }
                    }

                    attempt.last_error = Some(error);
                }
            }

            if !attempt.succeeded && attempt.retries < self.config.max_retries {
                tokio::time::sleep(self.delay.current()).await;
            }
        }

        result.unwrap_or_else(|| {
            warn!("Retries exhausted for {}", url);
            let message = attempt
                .last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            AnalysisResult::failed(url.to_string(), message)
        })
    }
}
