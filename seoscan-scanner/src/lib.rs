pub mod config;
pub mod debug;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod result;
pub mod scheduler;
pub mod sitemap;

pub use config::{ScanConfig, TotalPolicy};
pub use debug::{DebugInfo, DebugLog, RequestLog};
pub use error::{Result, ScanError};
pub use fetch::PageFetcher;
pub use progress::{CrawlEvent, CrawlStatus, ProgressEmitter, ProgressEvent, encode_sse};
pub use result::{AnalysisResult, PageMetadata, PageStatus, TechnicalSpecs, classify_issues};
pub use scheduler::{AdaptiveDelay, BatchScheduler, ProgressCallback};
pub use sitemap::{DiscoveryCallback, SitemapExpander, dedupe_urls};
