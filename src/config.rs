// src/config.rs

//! Application configuration.
//!
//! The deployment surface is environment-driven: `SCRAPER_URL`, `PORT`,
//! `DATABASE_URL` and `POLL_INTERVAL_SECS` are read from the environment,
//! everything else is a tunable field with a sensible default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Runtime configuration for the scraper service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Forum homepage to scrape for thread links
    pub homepage_url: String,

    /// HTTP listen port for the feed server
    pub port: u16,

    /// Persistent store connection string
    pub database_url: String,

    /// Seconds between poll cycles
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Cool-down after each thread-page fetch, in milliseconds
    pub cooldown_ms: u64,

    /// Hard ceiling on thread pages fetched per cycle
    pub max_threads_per_cycle: usize,

    /// Maximum concurrent thread-page fetches
    pub concurrency: usize,

    /// Capacity of the per-URL extraction cache
    pub cache_capacity: usize,

    /// Number of items in the published feed
    pub feed_items: usize,

    /// Where the generated feed document is written
    pub feed_path: PathBuf,

    /// User-Agent header for HTTP requests
    pub user_agent: String,
}

impl Config {
    /// Build configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            homepage_url: env_string("SCRAPER_URL", defaults::homepage_url),
            port: env_parsed("PORT", defaults::port()),
            database_url: env_string("DATABASE_URL", defaults::database_url),
            poll_interval_secs: env_parsed("POLL_INTERVAL_SECS", defaults::poll_interval()),
            ..Self::default()
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.homepage_url.trim().is_empty() {
            return Err(AppError::config("homepage_url is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::config("timeout_secs must be > 0"));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::config("poll_interval_secs must be > 0"));
        }
        if self.max_threads_per_cycle == 0 {
            return Err(AppError::config("max_threads_per_cycle must be > 0"));
        }
        if self.concurrency == 0 {
            return Err(AppError::config("concurrency must be > 0"));
        }
        if self.feed_items == 0 {
            return Err(AppError::config("feed_items must be > 0"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homepage_url: defaults::homepage_url(),
            port: defaults::port(),
            database_url: defaults::database_url(),
            poll_interval_secs: defaults::poll_interval(),
            timeout_secs: defaults::timeout(),
            cooldown_ms: defaults::cooldown_ms(),
            max_threads_per_cycle: defaults::max_threads_per_cycle(),
            concurrency: defaults::concurrency(),
            cache_capacity: defaults::cache_capacity(),
            feed_items: defaults::feed_items(),
            feed_path: defaults::feed_path(),
            user_agent: defaults::user_agent(),
        }
    }
}

fn env_string(key: &str, default: fn() -> String) -> String {
    std::env::var(key).unwrap_or_else(|_| default())
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Invalid {key}={raw}: {e}. Using default.");
            default
        }
    }
}

/// Default configuration values.
mod defaults {
    use std::path::PathBuf;

    pub fn homepage_url() -> String {
        "https://www.1tamilmv.se/".to_string()
    }

    pub fn port() -> u16 {
        8000
    }

    pub fn database_url() -> String {
        "sqlite://data/attachrss.db".to_string()
    }

    pub fn poll_interval() -> u64 {
        60
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn cooldown_ms() -> u64 {
        2000
    }

    pub fn max_threads_per_cycle() -> usize {
        30
    }

    pub fn concurrency() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    pub fn cache_capacity() -> usize {
        128
    }

    pub fn feed_items() -> usize {
        10
    }

    pub fn feed_path() -> PathBuf {
        PathBuf::from("data/feed.xml")
    }

    pub fn user_agent() -> String {
        format!("attachrss/{}", env!("CARGO_PKG_VERSION"))
    }
}
