//! Trend aggregation across sources with a bounded rolling history
//!
//! Each run queries the store for the recent window of every source, splits
//! the texts into language buckets and extracts thresholded term counts per
//! bucket. Within a source the Japanese counts overlay the English ones; the
//! per-source maps are then summed into one accumulator. The accumulator is
//! ranked by count (ties keep first-seen order), truncated, stamped and
//! appended to the history.
//!
//! The threshold is applied per source and per language, before merging. A
//! term that falls short in every individual bucket never surfaces, even if
//! its combined count would clear the threshold.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::language::{classify, partition, Language, Partitioned};
use super::terms::{TermExtractor, TermFrequencyMap};
use crate::config::TrendConfig;
use crate::error::{Error, Result};
use crate::ingest::decode_posts;
use crate::models::{ItemCategory, RawTextItem, TrendSnapshot};
use crate::storage::repository::SharedTextStore;
use crate::storage::report::ReportSink;

/// Bounded FIFO of past snapshots, oldest first
#[derive(Debug, Clone)]
pub struct TrendHistory {
    snapshots: VecDeque<TrendSnapshot>,
    capacity: usize,
}

impl TrendHistory {
    /// Create an empty history holding at most `capacity` snapshots
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild a history from stored snapshots, keeping the newest `capacity`
    pub fn from_snapshots<I>(capacity: usize, snapshots: I) -> Self
    where
        I: IntoIterator<Item = TrendSnapshot>,
    {
        let mut history = Self::new(capacity);
        for snapshot in snapshots {
            history.push(snapshot);
        }
        history
    }

    /// Append a snapshot, evicting and returning the oldest one when full
    pub fn push(&mut self, snapshot: TrendSnapshot) -> Option<TrendSnapshot> {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&TrendSnapshot> {
        self.snapshots.back()
    }

    /// Snapshots from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TrendSnapshot> {
        self.snapshots.iter()
    }
}

/// Add every count of `map` into `acc`
///
/// New terms are appended after existing ones, so `acc` keeps first-seen order.
pub fn merge_into(acc: &mut TermFrequencyMap, map: &TermFrequencyMap) {
    for (term, count) in map {
        *acc.entry(term.clone()).or_insert(0) += count;
    }
}

/// Copy every count of `map` into `acc`, replacing counts already present
///
/// A replaced term keeps its original position.
pub fn overlay_into(acc: &mut TermFrequencyMap, map: &TermFrequencyMap) {
    for (term, count) in map {
        acc.insert(term.clone(), *count);
    }
}

/// Rank terms by count descending and keep the first `top_n`
///
/// The sort is stable, so equal counts stay in accumulation order.
pub fn rank(acc: TermFrequencyMap, top_n: usize) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = acc.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top_n);
    ranked
}

/// Settings the monitor needs from [`TrendConfig`]
#[derive(Debug, Clone, Copy)]
struct TrendSettings {
    top_n: usize,
    cjk_threshold: u32,
    window: chrono::Duration,
}

/// Runs aggregation over the store and owns the trend history
pub struct TrendMonitor {
    store: SharedTextStore,
    extractor: TermExtractor,
    settings: TrendSettings,
    history: Mutex<TrendHistory>,
}

impl TrendMonitor {
    /// Create a monitor reading from `store`
    pub fn new(store: SharedTextStore, config: &TrendConfig) -> Self {
        Self {
            store,
            extractor: TermExtractor::new(config.min_mentions),
            settings: TrendSettings {
                top_n: config.top_n,
                cjk_threshold: config.cjk_code_point_threshold,
                window: config.window(),
            },
            history: Mutex::new(TrendHistory::new(config.history_capacity)),
        }
    }

    /// Continue from a previously saved history
    ///
    /// The configured capacity still applies; only the newest snapshots are kept.
    #[must_use]
    pub fn with_history(self, history: TrendHistory) -> Self {
        let capacity = self.lock_history().capacity();
        let restored = TrendHistory::from_snapshots(capacity, history.snapshots);
        *self.lock_history() = restored;
        self
    }

    /// Collect the recent texts of one source, split by language
    ///
    /// Store failures become [`Error::SourceUnavailable`]; an unusable window
    /// stays an [`Error::Config`]. Items with an undecodable payload are
    /// skipped individually.
    pub fn source_texts(&self, category: ItemCategory) -> Result<Partitioned<String>> {
        let items = self
            .store
            .query_recent(category, self.settings.window)
            .map_err(|e| match e {
                Error::Config(_) => e,
                e => Error::source_unavailable(category.as_str(), e),
            })?;

        if items.is_empty() {
            info!(source = %category, "No items collected in the current window");
            return Ok(Partitioned::default());
        }

        debug!(source = %category, items = items.len(), "Loaded recent items");

        let texts = match category {
            ItemCategory::Feed => self.feed_texts(items),
            ItemCategory::Social => self.social_texts(&items),
        };

        Ok(texts)
    }

    /// Articles are classified by title; title and summary share the bucket
    ///
    /// Each bucket lists all titles before all summaries. An article without
    /// a title still contributes its summary to the English bucket.
    fn feed_texts(&self, items: Vec<RawTextItem>) -> Partitioned<String> {
        let mut articles: Partitioned<RawTextItem> = Partitioned::default();
        for item in items {
            let language =
                classify(&item.title, self.settings.cjk_threshold).unwrap_or(Language::English);
            articles.bucket_mut(language).push(item);
        }

        let mut texts = Partitioned::default();
        for language in [Language::English, Language::Japanese] {
            let bucket = articles.bucket(language);
            let titles = bucket.iter().map(|a| &a.title);
            let summaries = bucket.iter().map(|a| &a.body);
            texts
                .bucket_mut(language)
                .extend(titles.chain(summaries).filter(|t| !t.is_empty()).cloned());
        }
        texts
    }

    /// Posts are decoded from each batch and classified one by one
    fn social_texts(&self, items: &[RawTextItem]) -> Partitioned<String> {
        let mut posts = Vec::new();

        for item in items {
            match decode_posts(item) {
                Ok(batch) => posts.extend(batch),
                Err(e) => {
                    warn!(key = %item.key, error = %e, "Skipping social batch with malformed payload");
                }
            }
        }

        partition(posts, self.settings.cjk_threshold)
    }

    /// Thresholded term counts for one source
    ///
    /// A term found in both language buckets takes its Japanese count.
    /// Never fails: an unavailable source contributes an empty map.
    pub fn analyze_source(&self, category: ItemCategory) -> TermFrequencyMap {
        let texts = match self.source_texts(category) {
            Ok(texts) => texts,
            Err(e) if e.is_recoverable() => {
                warn!(
                    source = %category,
                    category = e.category().as_str(),
                    error = %e,
                    "Source contributed nothing this run"
                );
                return TermFrequencyMap::new();
            }
            Err(e) => {
                error!(
                    source = %category,
                    category = e.category().as_str(),
                    error = %e,
                    "Source skipped, check configuration"
                );
                return TermFrequencyMap::new();
            }
        };

        let mut combined = TermFrequencyMap::new();
        for language in [Language::English, Language::Japanese] {
            let terms = self.extractor.extract(texts.bucket(language), language);
            debug!(
                source = %category,
                language = language.as_str(),
                terms = terms.len(),
                "Extracted trending terms"
            );
            overlay_into(&mut combined, &terms);
        }

        info!(source = %category, terms = combined.len(), "Extracted trend keywords");
        combined
    }

    /// Run one aggregation over all sources and record the snapshot
    pub fn run_once(&self) -> TrendSnapshot {
        info!(min_mentions = self.extractor.min_mentions(), "Trend update started");

        let mut acc = TermFrequencyMap::new();
        for category in ItemCategory::all() {
            let terms = self.analyze_source(category);
            merge_into(&mut acc, &terms);
        }

        let snapshot = TrendSnapshot::new(Utc::now(), rank(acc, self.settings.top_n));

        let evicted = self.lock_history().push(snapshot.clone());
        if let Some(old) = evicted {
            debug!(evicted = %old.timestamp, "History full, dropped oldest snapshot");
        }

        info!(trends = snapshot.len(), "Trend update finished");
        snapshot
    }

    /// Run once, then hand the snapshot and history to a report sink
    ///
    /// A sink failure is logged; the snapshot is still returned.
    pub fn run_and_report(&self, sink: &dyn ReportSink) -> TrendSnapshot {
        let snapshot = self.run_once();

        let history = self.lock_history();
        if let Err(e) = sink.emit(&snapshot, &history) {
            warn!(error = %e, "Failed to emit trend report");
        }

        snapshot
    }

    /// Copy of the current history
    pub fn history(&self) -> TrendHistory {
        self.lock_history().clone()
    }

    /// Most recent snapshot, if any run has completed
    pub fn latest(&self) -> Option<TrendSnapshot> {
        self.lock_history().latest().cloned()
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, TrendHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
