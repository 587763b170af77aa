// src/models.rs

//! Data structures shared across the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted feed item. Append-only: never mutated or deleted once
/// stored. `link` is the global uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Item title (trimmed anchor text, may be empty)
    pub title: String,

    /// Attachment URL, unique across the store
    pub link: String,

    /// When the link was first discovered
    pub published_at: DateTime<Utc>,
}

/// A transient (title, link) pair extracted from a thread page,
/// consumed by the dedup/insert step within a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub title: String,
    pub link: String,
}

impl Attachment {
    /// Stamp the pair into a persistable item at discovery time.
    pub fn into_item(self, published_at: DateTime<Utc>) -> Item {
        Item {
            title: self.title,
            link: self.link,
            published_at,
        }
    }
}
