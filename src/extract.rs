// src/extract.rs

//! Link extraction from parsed forum pages.
//!
//! The homepage lists recent threads inside styled paragraph blocks;
//! thread pages carry their downloads as `attachment.php` anchors.
//! Absent or malformed structure yields empty results, never an error.

use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{Html, Selector};
use url::Url;

use crate::models::Attachment;

/// Structural signature of the homepage thread listing.
const THREAD_ANCHOR_SELECTOR: &str = r#"p[style="font-size: 13.1px;"] a[href]"#;

/// Thread pages live under this path on the forum.
const THREAD_PATH_MARKER: &str = "/forums/topic/";

/// Attachment links on a thread page.
const ATTACHMENT_SELECTOR: &str = r#"a[href*="attachment.php"]"#;

fn thread_anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(THREAD_ANCHOR_SELECTOR).expect("valid selector"))
}

fn attachment_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(ATTACHMENT_SELECTOR).expect("valid selector"))
}

/// Extract forum-thread URLs from the homepage.
///
/// Anchors are resolved against `base`, filtered to thread-page URLs and
/// deduplicated preserving first-seen document order.
pub fn extract_thread_links(doc: &Html, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(thread_anchor_selector()) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let resolved = resolve(base, href);
        if resolved.contains(THREAD_PATH_MARKER) && seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}

/// Extract (title, link) attachment pairs from a thread page, in
/// document order. Titles are trimmed anchor text and may be empty.
pub fn extract_attachments(doc: &Html) -> Vec<Attachment> {
    let mut attachments = Vec::new();

    for anchor in doc.select(attachment_selector()) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title: String = anchor.text().collect::<String>().trim().to_string();
        attachments.push(Attachment {
            title,
            link: href.to_string(),
        });
    }

    attachments
}

/// Resolve a potentially relative href against the page base.
fn resolve(base: &Url, href: &str) -> String {
    base.join(href)
        .map(Into::into)
        .unwrap_or_else(|_| href.to_string())
}
