// src/feed.rs

//! RSS 2.0 feed rendering and publication.
//!
//! The feed document is a derived view of the latest stored items. It
//! is replaced wholesale on every publish via write-temp-then-rename,
//! so concurrent HTTP readers never observe a partial file.

use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Item;

const CHANNEL_TITLE: &str = "TamilMV RSS Feed";
const CHANNEL_DESCRIPTION: &str = "Share and support";
const CHANNEL_LINK: &str = "https://t.me/VC_Movie";

/// Renders items into the fixed-schema feed document and writes it
/// atomically to a well-known path.
pub struct FeedPublisher {
    path: PathBuf,
}

impl FeedPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render and atomically replace the feed file with the given
    /// items, most recent first.
    pub async fn publish(&self, items: &[Item]) -> Result<()> {
        let bytes = render(items)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        log::info!("Feed updated with {} items", items.len());
        Ok(())
    }
}

/// Render the RSS 2.0 document for the given items, in input order.
pub fn render(items: &[Item]) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text(&mut writer, "title", CHANNEL_TITLE)?;
    write_text(&mut writer, "description", CHANNEL_DESCRIPTION)?;
    write_text(&mut writer, "link", CHANNEL_LINK)?;

    for item in items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text(&mut writer, "title", &item.title)?;
        write_text(&mut writer, "link", &item.link)?;
        write_text(&mut writer, "pubDate", &item.published_at.to_rfc3339())?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(writer.into_inner())
}

fn write_text<W: std::io::Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
