//! Common test utilities

use chrono::{DateTime, Duration, Utc};
use beauty_trends::ingest::{FeedEntry, SocialBatch};
use beauty_trends::{ItemCategory, RawTextItem};

/// Create a feed entry with a link derived from `slug`
pub fn feed_entry(slug: &str, title: &str, summary: &str) -> FeedEntry {
    FeedEntry {
        link: format!("https://example-beauty.com/{slug}"),
        title: title.to_string(),
        summary: summary.to_string(),
        source: "Example Beauty".to_string(),
    }
}

/// Create a social batch collected now
pub fn social_batch(keyword: &str, posts: &[&str]) -> SocialBatch {
    SocialBatch {
        keyword: keyword.to_string(),
        posts: posts.iter().map(|p| p.to_string()).collect(),
        collected_at: Utc::now(),
    }
}

/// Raw feed item collected `hours_ago` hours in the past
#[allow(dead_code)]
pub fn feed_item_at(key: &str, title: &str, body: &str, hours_ago: i64) -> RawTextItem {
    RawTextItem {
        category: ItemCategory::Feed,
        key: key.to_string(),
        source: "Example Beauty".to_string(),
        title: title.to_string(),
        body: body.to_string(),
        tags: Vec::new(),
        collected_at: ago(hours_ago),
    }
}

#[allow(dead_code)]
pub fn ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

/// `text` repeated `n` times, space separated
#[allow(dead_code)]
pub fn repeat(text: &str, n: usize) -> String {
    vec![text; n].join(" ")
}
