use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use seoscan_core::analyze::{AnalyzeOptions, execute_analysis};
use seoscan_core::discovery::find_sitemaps;
use seoscan_core::history::MemoryHistoryStore;
use seoscan_core::report::{ReportFormat, generate_json_report, generate_text_report, save_report};
use seoscan_scanner::{
    CrawlEvent, CrawlStatus, ProgressEmitter, ScanConfig, TotalPolicy, encode_sse,
};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Parse a sitemap URL argument, trying to add https:// if needed
pub fn parse_sitemap_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = Url::parse(raw) {
        if parsed.scheme() == "http" || parsed.scheme() == "https" {
            return Some(parsed.to_string());
        }
        return None;
    }

    let with_scheme = format!("https://{}", raw);
    Url::parse(&with_scheme).ok().map(|u| u.to_string())
}

/// Expand ~ in a user-supplied output path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub async fn handle_analyze(sub_matches: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let concurrency = *sub_matches.get_one::<usize>("concurrency").unwrap_or(&5);
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<String>("output").cloned();
    let stream = sub_matches.get_flag("stream");
    let incremental_total = sub_matches.get_flag("incremental-total");

    let sitemap_url = match parse_sitemap_url(raw_url) {
        Some(url) => url,
        None => {
            eprintln!("{} Invalid sitemap URL '{}'", "✗".red().bold(), raw_url);
            std::process::exit(1);
        }
    };

    let mut config = ScanConfig::default().with_concurrency(concurrency);
    if incremental_total {
        config = config.with_total_policy(TotalPolicy::Incremental);
    }

    println!("🔎 Analyzing sitemap {}", sitemap_url.bright_white());
    println!("Concurrency: {}\n", concurrency);

    let (emitter, mut rx) = ProgressEmitter::channel();
    let store = Arc::new(MemoryHistoryStore::new());

    // Consume the event channel: raw SSE frames or a progress bar.
    let display = tokio::spawn(async move {
        if stream {
            while let Some(event) = rx.recv().await {
                print!("{}", encode_sse(&event));
            }
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            pb.set_message("Expanding sitemap...");

            while let Some(event) = rx.recv().await {
                match event {
                    CrawlEvent::Progress {
                        total,
                        current,
                        status,
                    } => {
                        pb.set_length(total as u64);
                        pb.set_position(current as u64);
                        if status != CrawlStatus::Starting {
                            pb.set_message("Analyzing pages");
                        }
                    }
                    CrawlEvent::Complete { .. } => {
                        pb.finish_with_message("Analysis complete");
                    }
                    CrawlEvent::Error { ref error, .. } => {
                        pb.abandon_with_message(format!("Failed: {}", error));
                    }
                }
            }
        }
    });

    let options = AnalyzeOptions {
        sitemap_url,
        config,
    };

    let result = execute_analysis(options, emitter, store).await;
    let _ = display.await;

    match result {
        Ok(data) => {
            let report = match format {
                ReportFormat::Text => generate_text_report(&data),
                ReportFormat::Json => match generate_json_report(&data) {
                    Ok(report) => report,
                    Err(e) => {
                        eprintln!("{} Failed to render JSON report: {}", "✗".red().bold(), e);
                        std::process::exit(1);
                    }
                },
            };

            if let Some(ref path) = output {
                let path = resolve_output_path(path);
                if let Err(e) = save_report(&report, &path) {
                    eprintln!(
                        "{} Failed to save report to {}: {}",
                        "✗".red().bold(),
                        path.display(),
                        e
                    );
                    std::process::exit(1);
                }
                println!(
                    "\n{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            } else {
                print!("\n{}", report);
            }
        }
        Err(e) => {
            eprintln!("{} Analysis failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_discover(sub_matches: &ArgMatches) {
    let domain = sub_matches.get_one::<String>("domain").unwrap();

    let client = match ScanConfig::default().build_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!("🔍 Probing {} for sitemaps\n", domain.bright_white());

    let discovery = find_sitemaps(&client, domain).await;

    if let Some(error) = discovery.error {
        eprintln!("{} {}", "✗".red().bold(), error);
        std::process::exit(1);
    }

    if !discovery.from_robots_txt.is_empty() {
        println!("{}", "From robots.txt:".bright_blue().bold());
        for sitemap in &discovery.from_robots_txt {
            println!("  {} {}", "✓".green().bold(), sitemap);
        }
        println!();
    }

    println!("{}", "Well-known locations:".bright_blue().bold());
    for location in &discovery.common_locations {
        if location.exists {
            let note = if location.is_index == Some(true) {
                " (sitemap index)"
            } else {
                ""
            };
            println!("  {} {}{}", "✓".green().bold(), location.url, note);
        } else {
            println!("  {} {}", "✗".red(), location.url.to_string().dimmed());
        }
    }

    let found = discovery.from_robots_txt.len()
        + discovery
            .common_locations
            .iter()
            .filter(|l| l.exists)
            .count();
    if found == 0 {
        println!("\n{} No sitemaps found for {}", "⚠".yellow().bold(), domain);
    }
}
