// src/store/sqlite.rs

//! SQLite-backed item store.

use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::models::Item;
use crate::store::DedupStore;

/// Item store over a pooled SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database at `url`, creating the file and schema
    /// if missing.
    pub async fn connect(url: &str) -> Result<Self> {
        // The driver creates a missing database file but not its
        // directory.
        let file = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
        if !file.is_empty() && !file.starts_with(':') {
            if let Some(parent) = std::path::Path::new(file).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // An in-memory SQLite database exists per connection, so the
        // pool is capped at one to keep tests and production on the
        // same shape. One poll cycle runs at a time anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                link TEXT NOT NULL UNIQUE,
                published_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_items_link ON items (link)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DedupStore for SqliteStore {
    async fn is_empty(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count == 0)
    }

    async fn known_links(&self) -> Result<HashSet<String>> {
        let links: Vec<String> = sqlx::query_scalar("SELECT link FROM items")
            .fetch_all(&self.pool)
            .await?;
        Ok(links.into_iter().collect())
    }

    async fn insert_batch(&self, items: &[Item]) -> Result<u64> {
        let mut inserted = 0;
        for item in items {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO items (title, link, published_at) VALUES (?1, ?2, ?3)",
            )
            .bind(&item.title)
            .bind(&item.link)
            .bind(item.published_at)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }

        let skipped = items.len() as u64 - inserted;
        if skipped > 0 {
            log::debug!("Skipped {skipped} items with duplicate links");
        }
        Ok(inserted)
    }

    async fn latest_n(&self, n: usize) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT title, link, published_at FROM items
             ORDER BY published_at DESC, id DESC
             LIMIT ?1",
        )
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    fn item(link: &str, minutes_ago: i64) -> Item {
        Item {
            title: format!("Title for {link}"),
            link: link.to_string(),
            published_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_empty_then_populated() {
        let store = memory_store().await;
        assert!(store.is_empty().await.unwrap());

        store.insert_batch(&[item("a", 0)]).await.unwrap();
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_links_skipped_within_batch() {
        let store = memory_store().await;
        let inserted = store
            .insert_batch(&[item("a", 2), item("b", 1), item("a", 0)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let links = store.known_links().await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.contains("a"));
        assert!(links.contains("b"));
    }

    #[tokio::test]
    async fn test_insert_batch_is_idempotent() {
        let store = memory_store().await;
        let batch = vec![item("a", 2), item("b", 1)];

        assert_eq!(store.insert_batch(&batch).await.unwrap(), 2);
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 0);
        assert_eq!(store.known_links().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_latest_n_descending_and_bounded() {
        let store = memory_store().await;
        let batch: Vec<Item> = (0..5).map(|i| item(&format!("link-{i}"), i)).collect();
        store.insert_batch(&batch).await.unwrap();

        let latest = store.latest_n(3).await.unwrap();
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].link, "link-0");
        assert_eq!(latest[1].link, "link-1");
        assert_eq!(latest[2].link, "link-2");
        assert!(latest.windows(2).all(|w| w[0].published_at > w[1].published_at));
    }

    #[tokio::test]
    async fn test_latest_n_larger_than_store() {
        let store = memory_store().await;
        store.insert_batch(&[item("only", 0)]).await.unwrap();

        let latest = store.latest_n(10).await.unwrap();
        assert_eq!(latest.len(), 1);
    }
}
