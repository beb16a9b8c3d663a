//! Report emission for trend snapshots
//!
//! The aggregator hands each new snapshot, together with the rolling history,
//! to a [`ReportSink`]. The JSON writer stores one pretty-printed file per
//! snapshot and keeps a `trend_history.json` with the whole history.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analytics::TrendHistory;
use crate::error::Result;
use crate::models::TrendSnapshot;
use crate::utils::{display_width, sanitize_filename};

/// Number of terms drawn in the text chart
pub const CHART_TERMS: usize = 15;

/// Receives each snapshot produced by the aggregator
pub trait ReportSink: Send + Sync {
    fn emit(&self, snapshot: &TrendSnapshot, history: &TrendHistory) -> Result<()>;
}

#[derive(Serialize)]
struct HistoryFile<'a> {
    capacity: usize,
    snapshots: Vec<&'a TrendSnapshot>,
}

#[derive(Deserialize)]
struct StoredHistory {
    snapshots: Vec<TrendSnapshot>,
}

/// Writes snapshot reports as JSON files
pub struct JsonReportWriter {
    output_dir: PathBuf,
}

impl JsonReportWriter {
    /// Create a writer, creating the output directory if needed
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// File path used for a snapshot
    pub fn report_path(&self, snapshot: &TrendSnapshot) -> PathBuf {
        let stamp = snapshot.timestamp.format("%Y-%m-%d_%H-%M-%S").to_string();
        self.output_dir
            .join(sanitize_filename(&format!("beauty_trends_{stamp}.json")))
    }

    /// File path of the rolling history
    pub fn history_path(&self) -> PathBuf {
        self.output_dir.join("trend_history.json")
    }

    /// Write one snapshot, returning the path written
    pub fn write_snapshot(&self, snapshot: &TrendSnapshot) -> Result<PathBuf> {
        let path = self.report_path(snapshot);
        fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(path)
    }

    /// Overwrite the history file with the current history
    pub fn write_history(&self, history: &TrendHistory) -> Result<PathBuf> {
        let file = HistoryFile {
            capacity: history.capacity(),
            snapshots: history.iter().collect(),
        };
        let path = self.history_path();
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        Ok(path)
    }

    /// Load the history written by a previous run, if any
    pub fn load_history(&self, capacity: usize) -> Result<Option<TrendHistory>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(None);
        }

        let stored: StoredHistory = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(Some(TrendHistory::from_snapshots(capacity, stored.snapshots)))
    }
}

impl ReportSink for JsonReportWriter {
    fn emit(&self, snapshot: &TrendSnapshot, history: &TrendHistory) -> Result<()> {
        let path = self.write_snapshot(snapshot)?;
        tracing::info!(path = %path.display(), "Trend report saved");

        self.write_history(history)?;
        Ok(())
    }
}

/// Render the top terms of a snapshot as a horizontal bar chart
pub fn text_chart(snapshot: &TrendSnapshot, max_terms: usize, width: usize) -> String {
    let rows: Vec<_> = snapshot.trends.iter().take(max_terms).collect();
    let Some(max_count) = rows.iter().map(|(_, c)| *c).max().filter(|c| *c > 0) else {
        return String::new();
    };
    let label_width = rows.iter().map(|(t, _)| display_width(t)).max().unwrap_or(0);

    let mut out = String::new();
    for (term, count) in rows {
        let bar = ((*count as f64 / max_count as f64) * width as f64).round() as usize;
        let pad = label_width - display_width(term);
        out.push_str(&format!(
            "{term}{} | {} {count}\n",
            " ".repeat(pad),
            "#".repeat(bar.max(1))
        ));
    }
    out
}
