// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{parse_sitemap_url, resolve_output_path};

// Re-export analysis functionality from seoscan-core
pub use seoscan_core::analyze::{AnalysisData, AnalyzeOptions, execute_analysis};
pub use seoscan_core::report::{generate_json_report, generate_text_report};
