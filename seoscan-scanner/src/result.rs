use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_TITLE_CHARS: usize = 60;
pub const MAX_DESCRIPTION_CHARS: usize = 160;

pub const ISSUE_MISSING_TITLE: &str = "Missing title";
pub const ISSUE_MISSING_DESCRIPTION: &str = "Missing meta description";
pub const ISSUE_TITLE_TOO_LONG: &str = "Title too long (>60 chars)";
pub const ISSUE_DESCRIPTION_TOO_LONG: &str = "Meta description too long (>160 chars)";
pub const ISSUE_MISSING_OG_IMAGE: &str = "Missing OpenGraph image";
pub const ISSUE_FETCH_FAILED: &str = "Failed to analyze page";

/// Metadata extracted from a fetched page. Empty string means the tag
/// was absent; values are trimmed of surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub news_keywords: String,
    pub og_site_name: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
}

/// Wall-clock fetch duration and body size. The persistence boundary
/// stores these as strings, so deserialization accepts both forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalSpecs {
    #[serde(deserialize_with = "u64_or_string")]
    pub load_speed_ms: u64,
    #[serde(deserialize_with = "u64_or_string")]
    pub page_size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Pass,
    Fail,
}

/// Outcome of analyzing one page URL. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub status: PageStatus,
    pub issues: Vec<String>,
    pub metadata: PageMetadata,
    pub technical_specs: TechnicalSpecs,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Build a result for a successfully fetched page, classifying its
    /// SEO issues. `status` is `fail` iff any issue was found.
    pub fn from_page(url: String, metadata: PageMetadata, technical_specs: TechnicalSpecs) -> Self {
        let issues = classify_issues(&metadata);
        let status = if issues.is_empty() {
            PageStatus::Pass
        } else {
            PageStatus::Fail
        };

        Self {
            url,
            status,
            issues,
            metadata,
            technical_specs,
            error: None,
        }
    }

    /// Placeholder for a URL whose retries were exhausted.
    pub fn failed(url: String, error: String) -> Self {
        Self {
            url,
            status: PageStatus::Fail,
            issues: vec![ISSUE_FETCH_FAILED.to_string()],
            metadata: PageMetadata::default(),
            technical_specs: TechnicalSpecs::default(),
            error: Some(error),
        }
    }
}

/// Classify SEO issues for a page. Checks are independent; the output
/// order is stable: title, description, length limits, OpenGraph image.
pub fn classify_issues(metadata: &PageMetadata) -> Vec<String> {
    let mut issues = Vec::new();

    if metadata.title.is_empty() {
        issues.push(ISSUE_MISSING_TITLE.to_string());
    }
    if metadata.description.is_empty() {
        issues.push(ISSUE_MISSING_DESCRIPTION.to_string());
    }
    if metadata.title.chars().count() > MAX_TITLE_CHARS {
        issues.push(ISSUE_TITLE_TOO_LONG.to_string());
    }
    if metadata.description.chars().count() > MAX_DESCRIPTION_CHARS {
        issues.push(ISSUE_DESCRIPTION_TOO_LONG.to_string());
    }
    if metadata.og_image.is_empty() {
        issues.push(ISSUE_MISSING_OG_IMAGE.to_string());
    }

    issues
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(u64),
    Str(String),
}

pub(crate) fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn u16_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64_or_string(deserializer)?;
    u16::try_from(value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_passes() {
        let metadata = PageMetadata {
            title: "Home".to_string(),
            description: "A short description.".to_string(),
            og_image: "https://example.com/og.png".to_string(),
            ..Default::default()
        };

        let result = AnalysisResult::from_page(
            "https://example.com/".to_string(),
            metadata,
            TechnicalSpecs::default(),
        );

        assert_eq!(result.status, PageStatus::Pass);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_long_title_and_missing_description() {
        let metadata = PageMetadata {
            title: "a".repeat(70),
            og_image: "https://example.com/og.png".to_string(),
            ..Default::default()
        };

        let result = AnalysisResult::from_page(
            "https://example.com/".to_string(),
            metadata,
            TechnicalSpecs::default(),
        );

        assert_eq!(result.status, PageStatus::Fail);
        assert_eq!(
            result.issues,
            vec![
                ISSUE_MISSING_DESCRIPTION.to_string(),
                ISSUE_TITLE_TOO_LONG.to_string(),
            ]
        );
    }

    #[test]
    fn test_title_at_limit_is_not_too_long() {
        let metadata = PageMetadata {
            title: "a".repeat(60),
            description: "ok".to_string(),
            og_image: "x".to_string(),
            ..Default::default()
        };
        assert!(classify_issues(&metadata).is_empty());

        let metadata = PageMetadata {
            title: "a".repeat(61),
            description: "ok".to_string(),
            og_image: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(classify_issues(&metadata), vec![ISSUE_TITLE_TOO_LONG]);
    }

    #[test]
    fn test_description_length_limit() {
        let metadata = PageMetadata {
            title: "t".to_string(),
            description: "d".repeat(161),
            og_image: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(
            classify_issues(&metadata),
            vec![ISSUE_DESCRIPTION_TOO_LONG]
        );
    }

    #[test]
    fn test_issue_order_is_stable() {
        let metadata = PageMetadata::default();
        assert_eq!(
            classify_issues(&metadata),
            vec![
                ISSUE_MISSING_TITLE,
                ISSUE_MISSING_DESCRIPTION,
                ISSUE_MISSING_OG_IMAGE,
            ]
        );
    }

    #[test]
    fn test_failed_placeholder() {
        let result =
            AnalysisResult::failed("https://example.com/x".to_string(), "Timeout".to_string());
        assert_eq!(result.status, PageStatus::Fail);
        assert_eq!(result.issues, vec![ISSUE_FETCH_FAILED]);
        assert_eq!(result.error.as_deref(), Some("Timeout"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = AnalysisResult::from_page(
            "https://example.com/".to_string(),
            PageMetadata::default(),
            TechnicalSpecs {
                load_speed_ms: 120,
                page_size_bytes: 4096,
            },
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["technicalSpecs"]["loadSpeedMs"], 120);
        assert_eq!(json["technicalSpecs"]["pageSizeBytes"], 4096);
        assert!(json["metadata"]["newsKeywords"].is_string());
        assert_eq!(json["status"], "fail");
    }

    #[test]
    fn test_deserializes_stringified_numbers() {
        let json = r#"{
            "url": "https://example.com/",
            "status": "pass",
            "issues": [],
            "metadata": {},
            "technicalSpecs": { "loadSpeedMs": "120", "pageSizeBytes": "4096" }
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.technical_specs.load_speed_ms, 120);
        assert_eq!(result.technical_specs.page_size_bytes, 4096);
    }
}
