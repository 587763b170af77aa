// src/fetch.rs

//! HTTP page fetching.
//!
//! The fetcher is behind a trait so the collector and scheduler can be
//! exercised without a network. It returns the raw body rather than a
//! parsed document: `scraper::Html` is not `Send`, so parsing happens
//! synchronously at the call site between awaits.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;

/// Capability to fetch a page body by URL.
///
/// Callers treat any error as "no results for this URL"; a failed fetch
/// is never fatal to a scrape cycle.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with a fixed per-request timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher from the configured user agent and timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        let config = Config::default();
        assert!(HttpFetcher::new(&config).is_ok());
    }
}
