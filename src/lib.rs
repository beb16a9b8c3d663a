//! beauty-trends - Beauty-industry trend monitor
//!
//! Harvested feed articles and social posts are stored in an append-only text
//! store; each run extracts frequently mentioned terms from the last 24 hours
//! and keeps a bounded rolling history of ranked snapshots.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`analytics`] - Language partitioning, term extraction and trend aggregation
//! - [`storage`] - SQLite text store, report output and CSV export
//! - [`ingest`] - Collector boundary for feed entries and social batches
//! - [`scheduler`] - Recurring trend runs
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use beauty_trends::analytics::TrendMonitor;
//! use beauty_trends::config::Config;
//! use beauty_trends::storage::create_sqlite_store;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let store = create_sqlite_store(&config.database.sqlite_path)?;
//!     let monitor = TrendMonitor::new(store, &config.trends);
//!     let snapshot = monitor.run_once();
//!     println!("{}", serde_json::to_string_pretty(&snapshot)?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{Language, TermExtractor, TrendHistory, TrendMonitor};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::ingest::{FeedEntry, SocialBatch};
    pub use crate::models::{AppendOutcome, ItemCategory, RawTextItem, TrendSnapshot};
    pub use crate::storage::{JsonReportWriter, ReportSink, SharedTextStore, TextStore};
}

// Direct re-exports for convenience
pub use models::{AppendOutcome, ItemCategory, RawTextItem, TrendSnapshot};
