// src/scheduler.rs

//! Scrape scheduling.
//!
//! One long-lived task drives the pipeline: a bootstrap scrape when the
//! store is empty, then a fixed-interval poll-and-diff loop. A cycle's
//! failures degrade to "fewer or zero new items"; nothing in the scrape
//! path terminates the loop. The HTTP server is a separate failure
//! domain.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use scraper::Html;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use url::Url;

use crate::collector::Collector;
use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_thread_links;
use crate::feed::FeedPublisher;
use crate::fetch::PageFetcher;
use crate::models::{Attachment, Item};
use crate::store::DedupStore;

/// Owns the scrape pipeline: homepage extraction, rate-limited
/// collection, dedup against the store and feed regeneration.
pub struct Scheduler<F> {
    config: Config,
    base_url: Url,
    fetcher: F,
    collector: Collector<F>,
    store: Arc<dyn DedupStore>,
    publisher: FeedPublisher,
}

impl<F: PageFetcher + Clone> Scheduler<F> {
    pub fn new(
        config: Config,
        fetcher: F,
        store: Arc<dyn DedupStore>,
        publisher: FeedPublisher,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.homepage_url)?;
        let collector = Collector::new(fetcher.clone(), &config);
        Ok(Self {
            config,
            base_url,
            fetcher,
            collector,
            store,
            publisher,
        })
    }

    /// Run bootstrap and then the poll loop until the stop signal fires.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        if let Err(e) = self.bootstrap().await {
            log::error!("Bootstrap failed: {e}");
        }

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; bootstrap already ran.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *stop.borrow() {
                        break;
                    }
                    if let Err(e) = self.poll().await {
                        log::error!("Poll cycle failed: {e}");
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Scheduler stopped");
    }

    /// Initial scrape, skipped when the store already holds data. The
    /// feed is published unconditionally afterwards so the HTTP surface
    /// has a document to serve.
    pub async fn bootstrap(&self) -> Result<()> {
        if !self.store.is_empty().await? {
            log::info!("Store already contains data. Skipping initial scrape.");
            return Ok(());
        }

        log::info!("Starting initial scrape");
        let candidates = self.scrape().await;
        let items = dedup_candidates(candidates);
        if !items.is_empty() {
            let inserted = self.store.insert_batch(&items).await?;
            log::info!("Inserted {inserted} items into the store");
        }

        self.republish().await
    }

    /// One poll-and-diff cycle: collect candidates, keep those with
    /// unknown links, insert and republish. No new items means no store
    /// mutation and no publish.
    pub async fn poll(&self) -> Result<()> {
        log::info!("Running scheduled poll");
        let candidates = self.scrape().await;
        if candidates.is_empty() {
            log::info!("No candidates collected this cycle");
            return Ok(());
        }

        let known = self.store.known_links().await?;
        let new_items = dedup_candidates(
            candidates
                .into_iter()
                .filter(|a| !known.contains(&a.link))
                .collect(),
        );

        if new_items.is_empty() {
            log::info!("No new items found");
            return Ok(());
        }

        let inserted = self.store.insert_batch(&new_items).await?;
        log::info!("New items found: {inserted}");
        self.republish().await
    }

    /// Fetch the homepage and collect attachment pairs from its thread
    /// pages. Any failure here degrades to an empty candidate list.
    async fn scrape(&self) -> Vec<Attachment> {
        let body = match self.fetcher.fetch(&self.config.homepage_url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to fetch homepage: {e}");
                return Vec::new();
            }
        };

        let thread_links = {
            let doc = Html::parse_document(&body);
            extract_thread_links(&doc, &self.base_url)
        };
        log::debug!("Homepage yielded {} thread links", thread_links.len());

        self.collector.collect(&thread_links).await
    }

    /// Regenerate the feed from the latest stored items.
    async fn republish(&self) -> Result<()> {
        let latest = self.store.latest_n(self.config.feed_items).await?;
        self.publisher.publish(&latest).await
    }
}

/// Stamp candidates into items, dropping repeated links within the
/// cycle (the same attachment can appear on several thread pages).
fn dedup_candidates(candidates: Vec<Attachment>) -> Vec<Item> {
    let now = Utc::now();
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|a| seen.insert(a.link.clone()))
        .map(|a| a.into_item(now))
        .collect()
}
