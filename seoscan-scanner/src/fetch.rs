use crate::debug::DebugLog;
use crate::error::{Result, ScanError};
use crate::result::{AnalysisResult, PageMetadata, TechnicalSpecs};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Instant;
use tracing::debug;

/// Fetches one page and turns it into an [`AnalysisResult`]. Transient
/// failures surface as errors so the scheduler can retry them.
pub struct PageFetcher {
    client: Client,
    debug: DebugLog,
}

impl PageFetcher {
    pub fn new(client: Client, debug: DebugLog) -> Self {
        Self { client, debug }
    }

    pub async fn fetch(&self, url: &str) -> Result<AnalysisResult> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(ScanError::RateLimited(url.to_string()));
        }
        if status >= 400 {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let metadata = extract_metadata(&body);
        let technical_specs = TechnicalSpecs {
            load_speed_ms: duration_ms,
            page_size_bytes: body.len() as u64,
        };

        self.debug.request_log(url, status, duration_ms).await;

        Ok(AnalysisResult::from_page(
            url.to_string(),
            metadata,
            technical_specs,
        ))
    }
}

fn classify_request_error(url: &str, error: reqwest::Error) -> ScanError {
    if error.is_timeout() {
        ScanError::Timeout(url.to_string())
    } else {
        ScanError::HttpError(error)
    }
}

/// Pull the SEO-relevant tags out of a page body. Synchronous on purpose:
/// the parsed document must not live across an await point.
fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string();

    PageMetadata {
        title,
        description: meta_content(&document, r#"meta[name="description"]"#),
        keywords: meta_content(&document, r#"meta[name="keywords"]"#),
        news_keywords: meta_content(&document, r#"meta[name="news_keywords"]"#),
        og_site_name: meta_content(&document, r#"meta[property="og:site_name"]"#),
        og_title: meta_content(&document, r#"meta[property="og:title"]"#),
        og_description: meta_content(&document, r#"meta[property="og:description"]"#),
        og_image: meta_content(&document, r#"meta[property="og:image"]"#),
    }
}

fn meta_content(document: &Html, selector: &str) -> String {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ISSUE_MISSING_DESCRIPTION, ISSUE_TITLE_TOO_LONG, PageStatus};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FULL_PAGE: &str = r#"<html><head>
        <title>  Example Page  </title>
        <meta name="description" content=" A tidy description. ">
        <meta name="keywords" content="one, two">
        <meta name="news_keywords" content="breaking">
        <meta property="og:site_name" content="Example">
        <meta property="og:title" content="Example Page">
        <meta property="og:description" content="OG description">
        <meta property="og:image" content="https://example.com/og.png">
    </head><body>hello</body></html>"#;

    #[test]
    fn test_extract_metadata_full_page() {
        let metadata = extract_metadata(FULL_PAGE);

        assert_eq!(metadata.title, "Example Page");
        assert_eq!(metadata.description, "A tidy description.");
        assert_eq!(metadata.keywords, "one, two");
        assert_eq!(metadata.news_keywords, "breaking");
        assert_eq!(metadata.og_site_name, "Example");
        assert_eq!(metadata.og_title, "Example Page");
        assert_eq!(metadata.og_description, "OG description");
        assert_eq!(metadata.og_image, "https://example.com/og.png");
    }

    #[test]
    fn test_extract_metadata_missing_tags_are_empty() {
        let metadata = extract_metadata("<html><head></head><body>bare</body></html>");

        assert_eq!(metadata.title, "");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.og_image, "");
    }

    fn fetcher(debug: DebugLog) -> PageFetcher {
        let client = crate::config::ScanConfig::default().build_client().unwrap();
        PageFetcher::new(client, debug)
    }

    #[tokio::test]
    async fn test_fetch_success_records_specs_and_log() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(FULL_PAGE),
            )
            .mount(&server)
            .await;

        let debug = DebugLog::new();
        let result = fetcher(debug.clone())
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.status, PageStatus::Pass);
        assert_eq!(result.technical_specs.page_size_bytes, FULL_PAGE.len() as u64);

        let info = debug.snapshot().await;
        assert_eq!(info.request_logs.len(), 1);
        assert_eq!(info.request_logs[0].status, 200);
    }

    #[tokio::test]
    async fn test_fetch_classifies_seo_issues() {
        let server = MockServer::start().await;
        let body = format!(
            "<html><head><title>{}</title></head><body></body></html>",
            "x".repeat(70)
        );
        Mock::given(method("GET"))
            .and(path("/long-title"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let result = fetcher(DebugLog::new())
            .fetch(&format!("{}/long-title", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.status, PageStatus::Fail);
        assert!(result.issues.contains(&ISSUE_MISSING_DESCRIPTION.to_string()));
        assert!(result.issues.contains(&ISSUE_TITLE_TOO_LONG.to_string()));
    }

    #[tokio::test]
    async fn test_fetch_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/throttled"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fetcher = fetcher(DebugLog::new());

        let err = fetcher
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::HttpStatus { status: 404, .. }));

        let err = fetcher
            .fetch(&format!("{}/throttled", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::RateLimited(_)));
    }
}
