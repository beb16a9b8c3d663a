//! Trend analytics: language partitioning, term extraction and aggregation
//!
//! Data flows store → [`language`] → [`terms`] (once per language bucket)
//! → [`trends`], which ranks the merged counts into a [`TrendSnapshot`]
//! and appends it to the rolling [`TrendHistory`].
//!
//! [`TrendSnapshot`]: crate::models::TrendSnapshot

pub mod language;
pub mod stopwords;
pub mod terms;
pub mod trends;

pub use language::{classify, partition, partition_by, Language, Partitioned};
pub use terms::{tokenize, TermExtractor, TermFrequencyMap};
pub use trends::{merge_into, overlay_into, rank, TrendHistory, TrendMonitor};
