//! Collector boundary: turning collected feed entries and social batches into
//! stored items.
//!
//! The HTTP and SDK clients that fetch the data live outside this crate. They
//! hand over [`FeedEntry`] and [`SocialBatch`] values (directly or as JSON
//! files via the `import` command), and this module normalises them into
//! [`RawTextItem`]s and appends them to the store.

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{AppendOutcome, ItemCategory, RawTextItem};
use crate::storage::repository::TextStore;
use crate::utils::normalize_whitespace;

/// One article read from a feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Permalink, used as the de-duplication key
    pub link: String,
    pub title: String,
    /// Summary or content, possibly HTML
    #[serde(default)]
    pub summary: String,
    /// Feed name (e.g. "Allure", "@cosme")
    pub source: String,
}

impl FeedEntry {
    /// Build the stored item, stripping HTML and tagging watch keywords
    pub fn to_item(&self, watch_keywords: &[String], collected_at: DateTime<Utc>) -> RawTextItem {
        let title = normalize_whitespace(&self.title);
        let summary = strip_html(&self.summary);
        let tags = match_keywords(&format!("{title} {summary}"), watch_keywords);

        RawTextItem {
            category: ItemCategory::Feed,
            key: self.link.trim().to_string(),
            source: self.source.clone(),
            title,
            body: summary,
            tags,
            collected_at,
        }
    }
}

/// Posts returned by one social search for a keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialBatch {
    pub keyword: String,
    pub posts: Vec<String>,
    /// Required: part of the de-duplication key
    pub collected_at: DateTime<Utc>,
}

impl SocialBatch {
    /// Build the stored item; the body is the JSON array of post texts
    pub fn to_item(&self) -> Result<RawTextItem> {
        let payload = serde_json::to_string(&self.posts)?;

        let mut hasher = Sha256::new();
        hasher.update(self.keyword.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.collected_at.to_rfc3339().as_bytes());
        hasher.update(b"\n");
        hasher.update(payload.as_bytes());

        Ok(RawTextItem {
            category: ItemCategory::Social,
            key: format!("{:x}", hasher.finalize()),
            source: self.keyword.clone(),
            title: self.keyword.clone(),
            body: payload,
            tags: vec![self.keyword.clone()],
            collected_at: self.collected_at,
        })
    }
}

/// Decode the post texts of a stored social batch
///
/// Non-string and empty members are dropped; a body that is not a JSON array
/// is a [`Error::MalformedPayload`].
pub fn decode_posts(item: &RawTextItem) -> Result<Vec<String>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&item.body).map_err(|e| Error::malformed(&item.key, e))?;

    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
        .collect())
}

/// Reduce an HTML fragment to its whitespace-normalised text
pub fn strip_html(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return normalize_whitespace(html);
    }

    let text = Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<String>();
    normalize_whitespace(&text)
}

/// Watch keywords that occur in `text`, compared case-insensitively
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        .cloned()
        .collect()
}

/// Outcome counts of an ingest batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl IngestStats {
    fn record(&mut self, outcome: Result<AppendOutcome>, key: &str) {
        match outcome {
            Ok(AppendOutcome::Inserted) => self.inserted += 1,
            Ok(AppendOutcome::Duplicate) => self.duplicates += 1,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to store item");
                self.failed += 1;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.duplicates + self.failed
    }
}

/// Append feed entries; already-stored permalinks count as duplicates
pub fn ingest_feed_entries(
    store: &dyn TextStore,
    entries: &[FeedEntry],
    watch_keywords: &[String],
) -> IngestStats {
    let mut stats = IngestStats::default();
    let now = Utc::now();

    for entry in entries {
        if entry.link.trim().is_empty() {
            warn!(title = %entry.title, source = %entry.source, "Skipping feed entry without link");
            stats.failed += 1;
            continue;
        }

        let item = entry.to_item(watch_keywords, now);
        debug!(key = %item.key, tags = ?item.tags, "Storing feed entry");
        stats.record(store.append(&item), &item.key);
    }

    info!(
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        failed = stats.failed,
        "Feed entries ingested"
    );
    stats
}

/// Append social batches, one stored item per batch
pub fn ingest_social_batches(store: &dyn TextStore, batches: &[SocialBatch]) -> IngestStats {
    let mut stats = IngestStats::default();

    for batch in batches {
        if batch.posts.is_empty() {
            debug!(keyword = %batch.keyword, "Skipping empty social batch");
            continue;
        }

        match batch.to_item() {
            Ok(item) => stats.record(store.append(&item), &item.key),
            Err(e) => {
                warn!(keyword = %batch.keyword, error = %e, "Failed to encode social batch");
                stats.failed += 1;
            }
        }
    }

    info!(
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        failed = stats.failed,
        "Social batches ingested"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::MockTextStore;

    fn keywords() -> Vec<String> {
        ["skincare", "Serum", "美容"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_html() {
        let html = "<p>New <b>serum</b> &amp; toner</p>\n<p>out now</p>";
        assert_eq!(strip_html(html), "New serum & toner out now");
        assert_eq!(strip_html("  plain   text "), "plain text");
    }

    #[test]
    fn test_strip_html_keeps_words_split_by_inline_tags() {
        assert_eq!(strip_html("<b>Se</b>rum of the <i>week</i>"), "Serum of the week");
    }

    #[test]
    fn test_match_keywords_case_insensitive() {
        let tags = match_keywords("SKINCARE routine with serum and 美容液", &keywords());
        assert_eq!(tags, vec!["skincare", "Serum", "美容"]);
        assert!(match_keywords("haircare", &keywords()).is_empty());
    }

    #[test]
    fn test_feed_entry_to_item() {
        let entry = FeedEntry {
            link: " https://allure.com/story ".to_string(),
            title: "The  serum edit".to_string(),
            summary: "<div>Best <i>skincare</i></div>".to_string(),
            source: "Allure".to_string(),
        };

        let item = entry.to_item(&keywords(), Utc::now());
        assert_eq!(item.key, "https://allure.com/story");
        assert_eq!(item.title, "The serum edit");
        assert_eq!(item.body, "Best skincare");
        assert_eq!(item.tags, vec!["skincare", "Serum"]);
    }

    #[test]
    fn test_social_batch_roundtrip_and_stable_key() {
        let batch = SocialBatch {
            keyword: "化粧水".to_string(),
            posts: vec!["化粧水 最高".to_string(), "new toner".to_string()],
            collected_at: Utc::now(),
        };

        let first = batch.to_item().unwrap();
        let second = batch.to_item().unwrap();
        assert_eq!(first.key, second.key);
        assert_eq!(decode_posts(&first).unwrap(), batch.posts);
    }

    #[test]
    fn test_social_batch_requires_collection_time() {
        let json = r#"{"keyword": "serum", "posts": ["serum day"]}"#;
        assert!(serde_json::from_str::<SocialBatch>(json).is_err());

        let json = r#"{"keyword": "serum", "posts": ["serum day"], "collected_at": "2026-10-17T06:00:00Z"}"#;
        let store = MockTextStore::new();
        for expected in [AppendOutcome::Inserted, AppendOutcome::Duplicate] {
            let batch: SocialBatch = serde_json::from_str(json).unwrap();
            let item = batch.to_item().unwrap();
            assert_eq!(store.append(&item).unwrap(), expected);
        }
    }

    #[test]
    fn test_decode_posts_drops_non_strings() {
        let mut item = SocialBatch {
            keyword: "toner".to_string(),
            posts: vec![],
            collected_at: Utc::now(),
        }
        .to_item()
        .unwrap();

        item.body = r#"["toner love", 42, null, "", "toner again"]"#.to_string();
        assert_eq!(decode_posts(&item).unwrap(), vec!["toner love", "toner again"]);

        item.body = "{not json".to_string();
        let err = decode_posts(&item).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[test]
    fn test_ingest_feed_counts_duplicates() {
        let store = MockTextStore::new();
        let entry = FeedEntry {
            link: "https://vogue.com/a".to_string(),
            title: "Glow".to_string(),
            summary: String::new(),
            source: "Vogue Beauty".to_string(),
        };
        let no_link = FeedEntry {
            link: String::new(),
            ..entry.clone()
        };

        let stats = ingest_feed_entries(&store, &[entry.clone(), entry, no_link], &keywords());
        assert_eq!(
            stats,
            IngestStats {
                inserted: 1,
                duplicates: 1,
                failed: 1
            }
        );
        assert_eq!(stats.total(), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ingest_social_skips_empty_batches() {
        let store = MockTextStore::new();
        let batches = vec![
            SocialBatch {
                keyword: "serum".to_string(),
                posts: vec!["serum day".to_string()],
                collected_at: Utc::now(),
            },
            SocialBatch {
                keyword: "mascara".to_string(),
                posts: Vec::new(),
                collected_at: Utc::now(),
            },
        ];

        let stats = ingest_social_batches(&store, &batches);
        assert_eq!(stats.inserted, 1);
        assert_eq!(store.count(ItemCategory::Social).unwrap(), 1);
    }
}
