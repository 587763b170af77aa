// src/collector.rs

//! Rate-limited concurrent collection of attachment links.
//!
//! Thread pages are fetched by a bounded worker pool; results join in
//! submission order even though execution is concurrent. A bounded LRU
//! cache keyed by URL avoids re-fetching pages already seen in this
//! process, including pages whose fetch failed.

use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use lru::LruCache;
use scraper::Html;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::extract::extract_attachments;
use crate::fetch::PageFetcher;
use crate::models::Attachment;

/// Fans out thread-page extraction with bounded concurrency and a
/// per-fetch cool-down to throttle aggregate request rate.
pub struct Collector<F> {
    fetcher: F,
    cache: Mutex<LruCache<String, Vec<Attachment>>>,
    concurrency: usize,
    max_per_cycle: usize,
    cooldown: Duration,
}

impl<F: PageFetcher> Collector<F> {
    /// Create a collector from the configured limits.
    pub fn new(fetcher: F, config: &Config) -> Self {
        let capacity =
            NonZeroUsize::new(config.cache_capacity.max(1)).expect("capacity is nonzero");
        Self {
            fetcher,
            cache: Mutex::new(LruCache::new(capacity)),
            concurrency: config.concurrency.max(1),
            max_per_cycle: config.max_threads_per_cycle,
            cooldown: config.cooldown(),
        }
    }

    /// Collect attachment pairs from the first `max_per_cycle` thread
    /// links, flattened in input order. Excess links are dropped for
    /// this cycle; a failed page contributes nothing.
    pub async fn collect(&self, thread_links: &[String]) -> Vec<Attachment> {
        let capped = &thread_links[..thread_links.len().min(self.max_per_cycle)];
        if capped.len() < thread_links.len() {
            log::debug!(
                "Capping cycle to {} of {} thread links",
                capped.len(),
                thread_links.len()
            );
        }

        stream::iter(capped.iter().cloned())
            .map(|url| async move { self.attachments_for(&url).await })
            .buffered(self.concurrency)
            .collect::<Vec<Vec<Attachment>>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Extraction result for one thread page, served from cache when
    /// available. The cool-down only applies when a fetch actually
    /// went out; the lock is never held across the fetch, and
    /// concurrent misses on the same URL resolve last-writer-wins.
    async fn attachments_for(&self, url: &str) -> Vec<Attachment> {
        if let Some(hit) = self.cache.lock().await.get(url) {
            return hit.clone();
        }

        let attachments = match self.fetcher.fetch(url).await {
            Ok(body) => {
                let doc = Html::parse_document(&body);
                extract_attachments(&doc)
            }
            Err(e) => {
                log::warn!("Failed to fetch thread page {url}: {e}");
                Vec::new()
            }
        };

        self.cache
            .lock()
            .await
            .put(url.to_string(), attachments.clone());

        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }

        attachments
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};

    #[derive(Clone, Default)]
    struct StubFetcher {
        pages: Arc<HashMap<String, String>>,
        calls: Arc<AtomicUsize>,
    }

    impl StubFetcher {
        fn new(pages: HashMap<String, String>) -> Self {
            Self {
                pages: Arc::new(pages),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "no such page"))
        }
    }

    fn thread_page(id: u32) -> String {
        format!(
            r#"<a href="https://forum.example.com/attachment.php?id={id}">File {id}</a>"#
        )
    }

    fn test_config() -> Config {
        Config {
            cooldown_ms: 0,
            concurrency: 4,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_output_in_submission_order() {
        let links: Vec<String> = (0..5)
            .map(|i| format!("https://forum.example.com/t/{i}"))
            .collect();
        let pages: HashMap<String, String> = links
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), thread_page(i as u32)))
            .collect();
        let collector = Collector::new(StubFetcher::new(pages), &test_config());

        let attachments = collector.collect(&links).await;
        let ids: Vec<&str> = attachments.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(ids, vec!["File 0", "File 1", "File 2", "File 3", "File 4"]);
    }

    #[tokio::test]
    async fn test_caps_input_to_cycle_ceiling() {
        let links: Vec<String> = (0..40)
            .map(|i| format!("https://forum.example.com/t/{i}"))
            .collect();
        let pages: HashMap<String, String> = links
            .iter()
            .map(|url| (url.clone(), thread_page(1)))
            .collect();
        let fetcher = StubFetcher::new(pages);
        let collector = Collector::new(fetcher.clone(), &test_config());

        let attachments = collector.collect(&links).await;
        assert_eq!(fetcher.call_count(), 30);
        assert_eq!(attachments.len(), 30);
    }

    #[tokio::test]
    async fn test_cache_avoids_refetch() {
        let url = "https://forum.example.com/t/1".to_string();
        let pages = HashMap::from([(url.clone(), thread_page(1))]);
        let fetcher = StubFetcher::new(pages);
        let collector = Collector::new(fetcher.clone(), &test_config());

        let first = collector.collect(std::slice::from_ref(&url)).await;
        let second = collector.collect(std::slice::from_ref(&url)).await;
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_isolated_and_cached() {
        let good = "https://forum.example.com/t/good".to_string();
        let bad = "https://forum.example.com/t/bad".to_string();
        let pages = HashMap::from([(good.clone(), thread_page(7))]);
        let fetcher = StubFetcher::new(pages);
        let collector = Collector::new(fetcher.clone(), &test_config());

        let links = vec![bad.clone(), good.clone()];
        let attachments = collector.collect(&links).await;
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].title, "File 7");

        // The failure is cached; the broken page is not hammered again.
        collector.collect(&[bad]).await;
        assert_eq!(fetcher.call_count(), 2);
    }
}
