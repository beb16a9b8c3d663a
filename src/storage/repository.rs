//! Text Store: append-only persistence of collected items
//!
//! Collectors append items; the aggregator reads back everything collected
//! inside a recent window. Each item is keyed per category, and appending a
//! key that is already stored is a no-op reported as
//! [`AppendOutcome::Duplicate`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │  Collectors / ingest │        │    TrendMonitor      │
//! └──────────┬───────────┘        └──────────┬───────────┘
//!            │ append                        │ query_recent
//!            ▼                               ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    TextStore trait                      │
//! └─────────────────────────────────────────────────────────┘
//!            │                               │
//!            ▼                               ▼
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │   SqliteTextStore    │        │    MockTextStore     │
//! └──────────────────────┘        └──────────────────────┘
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::analytics::{rank, TermFrequencyMap};
use crate::error::{Error, Result};
use crate::ingest::decode_posts;
use crate::models::{AppendOutcome, ItemCategory, RawTextItem};

/// Separator used for the stored tag list
const TAG_SEPARATOR: &str = ", ";

// ============================================================================
// Repository Trait
// ============================================================================

/// Append-only store of collected text items
pub trait TextStore: Send + Sync {
    /// Store an item unless its key is already present for its category
    fn append(&self, item: &RawTextItem) -> Result<AppendOutcome>;

    /// All items of a category collected at or after `since`, in no particular order
    fn query_since(&self, category: ItemCategory, since: DateTime<Utc>)
        -> Result<Vec<RawTextItem>>;

    /// All items of a category collected within `window` of now
    ///
    /// A window reaching past the earliest representable time is a
    /// configuration error.
    fn query_recent(
        &self,
        category: ItemCategory,
        window: chrono::Duration,
    ) -> Result<Vec<RawTextItem>> {
        let since = Utc::now().checked_sub_signed(window).ok_or_else(|| {
            Error::config(format!("look-back window {window} is out of range"))
        })?;
        self.query_since(category, since)
    }

    /// The `limit` most recently collected items of a category, newest first
    fn newest(&self, category: ItemCategory, limit: usize) -> Result<Vec<RawTextItem>>;

    /// Number of stored items of a category
    fn count(&self, category: ItemCategory) -> Result<usize>;

    /// Posts collected per social keyword within `window`, largest first
    ///
    /// Batches whose payload cannot be decoded are skipped.
    fn keyword_volume(
        &self,
        window: chrono::Duration,
        limit: usize,
    ) -> Result<Vec<(String, u64)>> {
        let mut volume = TermFrequencyMap::new();

        for item in self.query_recent(ItemCategory::Social, window)? {
            match decode_posts(&item) {
                Ok(posts) => *volume.entry(item.source).or_insert(0) += posts.len() as u64,
                Err(e) => {
                    tracing::warn!(key = %item.key, error = %e, "Skipping social batch in keyword volume");
                }
            }
        }

        Ok(rank(volume, limit))
    }
}

/// Format a timestamp so that string order equals time order
fn sortable_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`TextStore`]
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteTextStore {
    conn: Mutex<Connection>,
}

impl SqliteTextStore {
    /// Open (or create) a store at `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets the aggregator read while a collector writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite text store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create database schema
    fn create_schema(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS raw_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    category TEXT NOT NULL,
                    item_key TEXT NOT NULL,
                    source TEXT NOT NULL,
                    title TEXT NOT NULL,
                    body TEXT NOT NULL,
                    tags TEXT NOT NULL DEFAULT '',
                    collected_at TEXT NOT NULL,
                    UNIQUE (category, item_key)
                );

                CREATE INDEX IF NOT EXISTS idx_raw_items_window
                    ON raw_items(category, collected_at);
                "#,
        )?;

        Ok(())
    }
}

/// Column values of one stored row, decoded lazily
struct StoredRow {
    category: String,
    key: String,
    source: String,
    title: String,
    body: String,
    tags: String,
    collected_at: String,
}

impl StoredRow {
    const COLUMNS: &'static str = "category, item_key, source, title, body, tags, collected_at";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            category: row.get(0)?,
            key: row.get(1)?,
            source: row.get(2)?,
            title: row.get(3)?,
            body: row.get(4)?,
            tags: row.get(5)?,
            collected_at: row.get(6)?,
        })
    }

    /// Decode into an item; corrupt rows are logged and skipped
    fn into_item(self) -> Option<RawTextItem> {
        let Some(category) = ItemCategory::parse(&self.category) else {
            tracing::warn!(key = %self.key, category = %self.category, "Skipping stored item with unknown category");
            return None;
        };

        let collected_at = match DateTime::parse_from_rfc3339(&self.collected_at) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    collected_at = %self.collected_at,
                    error = %e,
                    "Skipping stored item with invalid timestamp"
                );
                return None;
            }
        };

        Some(RawTextItem {
            category,
            tags: self
                .tags
                .split(TAG_SEPARATOR)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            key: self.key,
            source: self.source,
            title: self.title,
            body: self.body,
            collected_at,
        })
    }
}

fn decode_rows(rows: Vec<StoredRow>) -> Vec<RawTextItem> {
    rows.into_iter().filter_map(StoredRow::into_item).collect()
}

impl TextStore for SqliteTextStore {
    fn append(&self, item: &RawTextItem) -> Result<AppendOutcome> {
        let conn = self.lock();

        let changed = conn.execute(
            r#"
                INSERT OR IGNORE INTO raw_items
                    (category, item_key, source, title, body, tags, collected_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            params![
                item.category.as_str(),
                item.key,
                item.source,
                item.title,
                item.body,
                item.tags.join(TAG_SEPARATOR),
                sortable_timestamp(&item.collected_at),
            ],
        )?;

        if changed == 0 {
            tracing::debug!(key = %item.key, category = %item.category, "Duplicate item ignored");
            Ok(AppendOutcome::Duplicate)
        } else {
            Ok(AppendOutcome::Inserted)
        }
    }

    fn query_since(
        &self,
        category: ItemCategory,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawTextItem>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM raw_items WHERE category = ?1 AND collected_at >= ?2",
            StoredRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![category.as_str(), sortable_timestamp(&since)],
                StoredRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(decode_rows(rows))
    }

    fn newest(&self, category: ItemCategory, limit: usize) -> Result<Vec<RawTextItem>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM raw_items WHERE category = ?1
             ORDER BY collected_at DESC, id DESC LIMIT ?2",
            StoredRow::COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![category.as_str(), limit], StoredRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(decode_rows(rows))
    }

    fn count(&self, category: ItemCategory) -> Result<usize> {
        let conn = self.lock();
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM raw_items WHERE category = ?1",
            params![category.as_str()],
            |row| row.get(0),
        )?;

        Ok(total as usize)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory implementation of [`TextStore`]
///
/// Useful for testing without database dependencies. Queries for a category
/// can be made to fail to exercise source-unavailable handling.
#[derive(Default)]
pub struct MockTextStore {
    items: RwLock<Vec<RawTextItem>>,
    failing: RwLock<HashSet<ItemCategory>>,
}

impl MockTextStore {
    /// Create a new mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every query for `category` return an error
    pub fn fail_queries_for(&self, category: ItemCategory) {
        self.failing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category);
    }

    /// Get the number of stored items
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextStore for MockTextStore {
    fn append(&self, item: &RawTextItem) -> Result<AppendOutcome> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        let exists = items
            .iter()
            .any(|i| i.category == item.category && i.key == item.key);
        if exists {
            return Ok(AppendOutcome::Duplicate);
        }

        items.push(item.clone());
        Ok(AppendOutcome::Inserted)
    }

    fn query_since(
        &self,
        category: ItemCategory,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawTextItem>> {
        let failing = self.failing.read().unwrap_or_else(PoisonError::into_inner);
        if failing.contains(&category) {
            return Err(Error::other(format!("mock store offline for {category}")));
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items
            .iter()
            .filter(|i| i.category == category && i.collected_at >= since)
            .cloned()
            .collect())
    }

    fn newest(&self, category: ItemCategory, limit: usize) -> Result<Vec<RawTextItem>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);

        // Reverse insertion order first so equal timestamps list the later append first
        let mut newest: Vec<_> = items
            .iter()
            .rev()
            .filter(|i| i.category == category)
            .cloned()
            .collect();
        newest.sort_by(|a, b| b.collected_at.cmp(&a.collected_at));
        newest.truncate(limit);

        Ok(newest)
    }

    fn count(&self, category: ItemCategory) -> Result<usize> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.iter().filter(|i| i.category == category).count())
    }
}

// ============================================================================
// Shared Store Types
// ============================================================================

/// Thread-safe shared store handle
pub type SharedTextStore = Arc<dyn TextStore>;

/// Create a shared SQLite store
pub fn create_sqlite_store(path: impl AsRef<Path>) -> Result<SharedTextStore> {
    let store = SqliteTextStore::new(path)?;
    Ok(Arc::new(store))
}

/// Create a shared mock store
pub fn create_mock_store() -> SharedTextStore {
    Arc::new(MockTextStore::new())
}

// ============================================================================
// Tests
// ============================================================================
