use crate::analyze::AnalysisData;
use seoscan_scanner::{AnalysisResult, PageStatus};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Generate a plain-text analysis report
pub fn generate_text_report(data: &AnalysisData) -> String {
    let passed = data
        .details
        .iter()
        .filter(|r| r.status == PageStatus::Pass)
        .count();
    let failed = data.details.len() - passed;

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  URLs analyzed: {}\n", data.urls_analyzed));
    report.push_str(&format!("  Passed: {}\n", passed));
    report.push_str(&format!("  Failed: {}\n", failed));
    report.push_str(&format!("  Issues found: {}\n", data.issues));
    report.push_str(&format!(
        "  Processing time: {:.2} s\n",
        data.debug_info.processing_time_ms as f64 / 1000.0
    ));

    let issue_counts = count_issues(&data.details);
    if !issue_counts.is_empty() {
        report.push_str("\n# Issue breakdown:\n");
        for (issue, count) in issue_counts {
            report.push_str(&format!("  {:>4} × {}\n", count, issue));
        }
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group results by host
    let mut by_host: HashMap<String, Vec<&AnalysisResult>> = HashMap::new();
    for result in &data.details {
        if let Ok(url) = Url::parse(&result.url)
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(result);
        }
    }

    let mut hosts: Vec<&String> = by_host.keys().collect();
    hosts.sort();

    for host in hosts {
        let host_results = &by_host[host];
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages analyzed\n\n", host_results.len()));

        for result in host_results {
            let marker = match result.status {
                PageStatus::Pass => "✓",
                PageStatus::Fail => "✗",
            };
            let path = extract_url_path(&result.url);

            if let Some(ref error) = result.error {
                report.push_str(&format!("  {} {} (fetch failed: {})\n", marker, path, error));
            } else {
                report.push_str(&format!(
                    "  {} {} ({} ms, {})\n",
                    marker,
                    path,
                    result.technical_specs.load_speed_ms,
                    format_size(result.technical_specs.page_size_bytes)
                ));
            }

            for issue in &result.issues {
                report.push_str(&format!("      - {}\n", issue));
            }
        }
        report.push('\n');
    }

    // Diagnostic counters
    report.push_str("# Debug:\n");
    report.push_str(&format!(
        "  Network errors: {}\n",
        data.debug_info.network_errors.len()
    ));
    report.push_str(&format!(
        "  Parsing errors: {}\n",
        data.debug_info.parsing_errors.len()
    ));
    report.push_str(&format!(
        "  Rate limiting notices: {}\n",
        data.debug_info.rate_limiting_issues.len()
    ));

    report
}

/// Generate a structured JSON report
pub fn generate_json_report(data: &AnalysisData) -> Result<String, serde_json::Error> {
    let passed = data
        .details
        .iter()
        .filter(|r| r.status == PageStatus::Pass)
        .count();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "seoscan",
                "version": env!("CARGO_PKG_VERSION"),
                "generatedAt": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "urlsAnalyzed": data.urls_analyzed,
                "passed": passed,
                "failed": data.details.len() - passed,
                "totalIssues": data.issues
            },
            "results": data.details,
            "debugInfo": data.debug_info
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}

fn count_issues(details: &[AnalysisResult]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in details {
        for issue in &result.issues {
            *counts.entry(issue.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(issue, count)| (issue.to_string(), count))
        .collect();
    // Most frequent first, alphabetical within ties
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
