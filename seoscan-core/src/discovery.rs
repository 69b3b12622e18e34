use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Well-known sitemap locations probed after robots.txt.
pub const COMMON_SITEMAP_PATHS: [&str; 4] = [
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemaps.xml",
    "/sitemap/sitemap.xml",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapLocation {
    pub url: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_index: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapDiscovery {
    pub from_robots_txt: Vec<String>,
    pub common_locations: Vec<SitemapLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Probe a bare domain for candidate sitemap URLs: `Sitemap:` directives
/// in robots.txt first, then HEAD checks against the well-known paths,
/// skipping anything robots.txt already named.
pub async fn find_sitemaps(client: &Client, domain: &str) -> SitemapDiscovery {
    let clean = normalize_url(domain);
    let base = if domain.starts_with("http://") {
        format!("http://{clean}")
    } else {
        format!("https://{clean}")
    };

    let robots_url = format!("{base}/robots.txt");
    let mut seen: HashSet<String> = HashSet::new();
    let mut from_robots_txt = Vec::new();

    match fetch_text(client, &robots_url).await {
        Ok(body) => {
            for sitemap in parse_robots_sitemaps(&body) {
                if seen.insert(normalize_url(&sitemap)) {
                    from_robots_txt.push(sitemap);
                }
            }
        }
        Err(error) => {
            return SitemapDiscovery {
                error: Some(error),
                ..Default::default()
            };
        }
    }

    let mut common_locations = Vec::new();
    for probe_path in COMMON_SITEMAP_PATHS {
        let url = format!("{base}{probe_path}");
        if seen.contains(&normalize_url(&url)) {
            continue;
        }

        match client.head(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let content_type = response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                debug!("Found sitemap candidate at {}", url);

                seen.insert(normalize_url(&url));
                common_locations.push(SitemapLocation {
                    url,
                    exists: true,
                    is_index: Some(content_type.contains("xml") && probe_path.contains("index")),
                });
            }
            _ => {
                common_locations.push(SitemapLocation {
                    url,
                    exists: false,
                    is_index: None,
                });
            }
        }
    }

    SitemapDiscovery {
        from_robots_txt,
        common_locations,
        error: None,
    }
}

/// Collect `Sitemap:` directive values from a robots.txt body. The
/// directive name is matched case-insensitively.
pub fn parse_robots_sitemaps(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.len() > 8 && line[..8].eq_ignore_ascii_case("sitemap:") {
                let value = line[8..].trim();
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            } else {
                None
            }
        })
        .collect()
}

/// Strip scheme and trailing slash so equivalent URLs compare equal.
fn normalize_url(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch {url}: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("Failed to fetch {url}: HTTP {}", response.status()));
    }

    response
        .text()
        .await
        .map_err(|e| format!("Failed to read {url}: {e}"))
}
