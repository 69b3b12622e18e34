use crate::config::ScanConfig;
use crate::debug::DebugLog;
use futures::future::{BoxFuture, join_all};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};
use url::Url;

/// Called with the cumulative leaf-URL count as nested sitemaps resolve.
pub type DiscoveryCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// A parsed sitemap document: either leaf page URLs or child sitemaps.
enum SitemapDocument {
    UrlSet(Vec<String>),
    Index(Vec<String>),
}

/// Recursively expands a sitemap URL into leaf page URLs. Fetch and parse
/// failures are isolated per node: the failing subtree resolves to an
/// empty list while its siblings continue.
pub struct SitemapExpander {
    client: Client,
    concurrency: usize,
    max_depth: usize,
    debug: DebugLog,
    discovery_callback: Option<DiscoveryCallback>,
    discovered: AtomicUsize,
}

impl SitemapExpander {
    pub fn new(client: Client, config: &ScanConfig, debug: DebugLog) -> Self {
        Self {
            client,
            concurrency: config.concurrency,
            max_depth: config.max_sitemap_depth,
            debug,
            discovery_callback: None,
            discovered: AtomicUsize::new(0),
        }
    }

    pub fn with_discovery_callback(mut self, callback: DiscoveryCallback) -> Self {
        self.discovery_callback = Some(callback);
        self
    }

    /// Expand a sitemap tree into leaf page URLs. Never fails: all node
    /// errors land in the debug accumulator instead.
    pub async fn expand(&self, sitemap_url: &str) -> Vec<String> {
        let urls = self.expand_node(sitemap_url.to_string(), 0).await;

        if urls.is_empty() {
            self.debug.set_xml_status("failed").await;
        } else {
            self.debug.set_xml_status("success").await;
        }

        debug!("Expanded {} into {} leaf URLs", sitemap_url, urls.len());
        urls
    }

    fn expand_node<'a>(&'a self, url: String, depth: usize) -> BoxFuture<'a, Vec<String>> {
        Box::pin(async move {
            if depth > self.max_depth {
                self.debug
                    .parsing_error(format!(
                        "Sitemap nesting exceeds depth {} at {}",
                        self.max_depth, url
                    ))
                    .await;
                return Vec::new();
            }

            let body = match self.fetch_sitemap(&url).await {
                Ok(body) => body,
                Err(message) => {
                    warn!("{}", message);
                    self.debug.network_error(message).await;
                    return Vec::new();
                }
            };

            let document = match parse_sitemap(&body) {
                Ok(document) => document,
                Err(error) => {
                    self.debug
                        .parsing_error(format!("Error parsing XML from {url}: {error}"))
                        .await;
                    return Vec::new();
                }
            };

            match document {
                SitemapDocument::UrlSet(locs) => {
                    if let Some(ref callback) = self.discovery_callback {
                        let total =
                            self.discovered.fetch_add(locs.len(), Ordering::Relaxed) + locs.len();
                        callback(total);
                    }
                    locs
                }
                SitemapDocument::Index(children) => {
                    debug!("{} is a sitemap index with {} children", url, children.len());
                    let mut leaves = Vec::new();

                    // Bounded fan-out: children expand in concurrency-sized
                    // batches rather than all at once.
                    for chunk in children.chunks(self.concurrency) {
                        let batch = join_all(
                            chunk
                                .iter()
                                .map(|child| self.expand_node(child.clone(), depth + 1)),
                        )
                        .await;

                        for urls in batch {
                            leaves.extend(urls);
                        }
                    }

                    leaves
                }
            }
        })
    }

    async fn fetch_sitemap(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Error fetching sitemap {url}: {e}"))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(format!("Error fetching sitemap {url}: HTTP {status}"));
        }

        response
            .text()
            .await
            .map_err(|e| format!("Error reading sitemap {url}: {e}"))
    }
}

/// Scan a sitemap document for `<loc>` values, classifying it as a plain
/// urlset or a sitemap index. Empty loc values are dropped silently.
fn parse_sitemap(xml: &str) -> Result<SitemapDocument, String> {
    let mut reader = Reader::from_str(xml);

    let mut in_loc = false;
    let mut saw_urlset = false;
    let mut saw_index = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"urlset" => saw_urlset = true,
                    b"sitemapindex" => saw_index = true,
                    b"loc" => in_loc = true,
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Event::Text(t) => {
                if in_loc {
                    let text = t.unescape().map_err(|e| e.to_string())?.trim().to_string();
                    if !text.is_empty() {
                        locs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if saw_index && !saw_urlset {
        Ok(SitemapDocument::Index(locs))
    } else {
        Ok(SitemapDocument::UrlSet(locs))
    }
}

/// Collapse exact-string duplicates (first occurrence wins) and drop
/// entries that do not parse as URLs, logging each rejection.
pub async fn dedupe_urls(urls: Vec<String>, debug: &DebugLog) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for url in urls {
        if !seen.insert(url.clone()) {
            continue;
        }

        if Url::parse(&url).is_err() {
            debug
                .parsing_error(format!("Invalid URL in sitemap: {url}"))
                .await;
            continue;
        }

        unique.push(url);
    }

    unique
}
