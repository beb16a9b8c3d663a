//! CSV export of the newest stored feed articles

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{ItemCategory, RawTextItem};
use crate::storage::repository::TextStore;

/// Articles written by a default export
pub const EXPORT_LIMIT: usize = 1000;

/// One CSV row
#[derive(Debug, Serialize)]
struct ArticleRecord<'a> {
    link: &'a str,
    title: &'a str,
    summary: &'a str,
    source: &'a str,
    keywords: String,
    collected_at: String,
}

impl<'a> From<&'a RawTextItem> for ArticleRecord<'a> {
    fn from(item: &'a RawTextItem) -> Self {
        Self {
            link: &item.key,
            title: &item.title,
            summary: &item.body,
            source: &item.source,
            keywords: item.tags.join(", "),
            collected_at: item.collected_at.to_rfc3339(),
        }
    }
}

/// Write items as CSV with a header row, returning the number of rows
pub fn write_articles_csv<W: Write>(writer: W, items: &[RawTextItem]) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);

    for item in items {
        out.serialize(ArticleRecord::from(item))?;
    }

    out.flush()?;
    Ok(items.len())
}

/// Export the newest `limit` feed articles to a CSV file
pub fn export_articles(store: &dyn TextStore, path: &Path, limit: usize) -> Result<usize> {
    let articles = store.newest(ItemCategory::Feed, limit)?;

    let file = File::create(path).map_err(|e| {
        Error::with_source(format!("Cannot create export file {}", path.display()), e)
    })?;
    let written = write_articles_csv(file, &articles)?;

    tracing::info!(path = %path.display(), articles = written, "CSV export complete");
    Ok(written)
}
