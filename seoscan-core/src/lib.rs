pub mod analyze;
pub mod discovery;
pub mod history;
pub mod report;

pub use analyze::{AnalysisData, AnalyzeOptions, execute_analysis};
pub use discovery::{SitemapDiscovery, SitemapLocation, find_sitemaps};
pub use history::{HistoryRecord, HistoryStore, MemoryHistoryStore, RecordStatus};
pub use report::{ReportFormat, generate_json_report, generate_text_report, save_report};

pub fn print_banner() {
    println!(
        r"
  ___  ___  ___  ___  ___ __ _ _ __
 / __|/ _ \/ _ \/ __|/ __/ _` | '_ \
 \__ \  __/ (_) \__ \ (_| (_| | | | |
 |___/\___|\___/|___/\___\__,_|_| |_|
"
    );
    println!("  seoscan v{} - sitemap-driven SEO analyzer\n", env!("CARGO_PKG_VERSION"));
}
