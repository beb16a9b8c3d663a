// Core data structures for the trend monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of collected item, one per upstream source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Feed article: title plus plain-text summary
    Feed,
    /// Social keyword batch: body is a JSON array of post texts
    Social,
}

impl ItemCategory {
    /// Get string representation (also the stored column value)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Social => "social",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "feed" | "rss" => Some(Self::Feed),
            "social" | "twitter" | "x" => Some(Self::Social),
            _ => None,
        }
    }

    /// Get all categories in aggregation order
    pub fn all() -> [Self; 2] {
        [Self::Feed, Self::Social]
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Collected text item, immutable once stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTextItem {
    pub category: ItemCategory,
    pub key: String,    // Stable unique key (permalink, batch hash)
    pub source: String, // Feed name or search keyword
    pub title: String,
    pub body: String, // Summary text or JSON array of posts
    #[serde(default)]
    pub tags: Vec<String>,
    pub collected_at: DateTime<Utc>,
}

/// Result of appending an item to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted,
    Duplicate,
}

impl AppendOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// One ranked, time-stamped trend result
///
/// Serializes as `{"timestamp": "...", "trends": [["term", count], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub timestamp: DateTime<Utc>,
    pub trends: Vec<(String, u64)>,
}

impl TrendSnapshot {
    pub fn new(timestamp: DateTime<Utc>, trends: Vec<(String, u64)>) -> Self {
        Self { timestamp, trends }
    }

    pub fn len(&self) -> usize {
        self.trends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }

    /// Look up the count of a term in this snapshot
    pub fn count_of(&self, term: &str) -> Option<u64> {
        self.trends
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, count)| *count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_string_roundtrip() {
        for category in ItemCategory::all() {
            assert_eq!(ItemCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ItemCategory::parse("RSS"), Some(ItemCategory::Feed));
        assert_eq!(ItemCategory::parse("instagram"), None);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let ts = DateTime::parse_from_rfc3339("2026-10-17T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let snapshot = TrendSnapshot::new(ts, vec![("serum".into(), 7), ("美容液".into(), 5)]);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["timestamp"], "2026-10-17T06:00:00Z");
        assert_eq!(value["trends"][0][0], "serum");
        assert_eq!(value["trends"][0][1], 7);
        assert_eq!(value["trends"][1][0], "美容液");
    }

    #[test]
    fn test_count_of() {
        let snapshot = TrendSnapshot::new(Utc::now(), vec![("toner".into(), 7)]);
        assert_eq!(snapshot.count_of("toner"), Some(7));
        assert_eq!(snapshot.count_of("serum"), None);
        assert!(!snapshot.is_empty());
    }
}
