// src/store/mod.rs

//! Persistent item store abstraction.
//!
//! The store is the authoritative, append-only archive of discovered
//! items, keyed by link URL. The feed document is always derivable
//! from it.

pub mod sqlite;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Item;

pub use sqlite::SqliteStore;

/// Trait for deduplicating item storage backends.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Whether the store holds no items yet.
    async fn is_empty(&self) -> Result<bool>;

    /// Projection of all stored link keys, for client-side diffing of
    /// candidate items.
    async fn known_links(&self) -> Result<HashSet<String>>;

    /// Insert items, silently skipping duplicate links. Returns the
    /// count actually inserted; partial success is the expected
    /// outcome, not an error.
    async fn insert_batch(&self, items: &[Item]) -> Result<u64>;

    /// The most recent `n` items, descending by publication time.
    async fn latest_n(&self, n: usize) -> Result<Vec<Item>>;
}
