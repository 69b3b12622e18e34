use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// How the progress `total` behaves while nested sitemap indexes resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPolicy {
    /// `total` is fixed once expansion and deduplication finish.
    Fixed,
    /// `starting` events carry a growing `total` as leaf URLs are discovered.
    Incremental,
}

/// Tunables for a single analysis run. Defaults match the documented
/// behavior contracts; changing them does not change semantics.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub max_retries: u32,
    pub concurrency: usize,
    pub rate_limit_cooldown: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_sitemap_depth: usize,
    pub total_policy: TotalPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_redirects: 5,
            max_retries: 3,
            concurrency: 5,
            rate_limit_cooldown: Duration::from_secs(1),
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            max_sitemap_depth: 10,
            total_policy: TotalPolicy::Fixed,
        }
    }
}

impl ScanConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn with_total_policy(mut self, policy: TotalPolicy) -> Self {
        self.total_policy = policy;
        self
    }

    /// Build the shared HTTP client used for sitemap and page fetches.
    pub fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(concat!("seoscan/", env!("CARGO_PKG_VERSION")))
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contracts() {
        let config = ScanConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(1));
        assert_eq!(config.min_delay, Duration::from_millis(200));
        assert_eq!(config.total_policy, TotalPolicy::Fixed);
    }

    #[test]
    fn test_concurrency_floor() {
        let config = ScanConfig::default().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_build_client() {
        let config = ScanConfig::default();
        assert!(config.build_client().is_ok());
    }
}
