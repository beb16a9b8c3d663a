//! Configuration management for the trend monitor
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every value has a default, so the aggregation
//! pipeline can always run against whatever the store already holds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trend extraction configuration
    pub trends: TrendConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Report output configuration
    pub reports: ReportConfig,

    /// Recurring run configuration
    pub schedule: ScheduleConfig,

    /// Collector-side ingest configuration
    pub ingest: IngestConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trend extraction and aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum mentions per source and language before a term counts as trending
    pub min_mentions: u64,

    /// Number of terms kept in each snapshot
    pub top_n: usize,

    /// Number of snapshots retained in the rolling history
    pub history_capacity: usize,

    /// First-character code point above which text is treated as CJK
    pub cjk_code_point_threshold: u32,

    /// Look-back window for store queries, in hours
    pub window_hours: u64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_mentions: 5,
            top_n: 20,
            history_capacity: 100,
            cjk_code_point_threshold: 1000,
            window_hours: 24,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/beauty_trends.db"),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory receiving JSON snapshot reports
    pub output_dir: PathBuf,

    /// Write a report file after each run
    pub enabled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            enabled: true,
        }
    }
}

/// Recurring run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Hours between runs in watch mode
    pub interval_hours: u64,

    /// Run once immediately when watch mode starts
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: 6,
            run_on_start: true,
        }
    }
}

/// Collector-side ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Keywords tagged on feed articles when they appear in title or summary
    pub watch_keywords: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            watch_keywords: DEFAULT_WATCH_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const DEFAULT_WATCH_KEYWORDS: &[&str] = &[
    "skincare",
    "makeup",
    "haircare",
    "beauty",
    "cosmetics",
    "スキンケア",
    "メイク",
    "コスメ",
    "美容",
    "ヘアケア",
];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Upper bound for `window_hours` and `interval_hours` (ten years)
pub const MAX_HOURS: u64 = 24 * 365 * 10;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let trends = TrendConfig {
            min_mentions: env_parse("BEAUTY_MIN_MENTIONS").unwrap_or(defaults.trends.min_mentions),
            top_n: env_parse("BEAUTY_TOP_N").unwrap_or(defaults.trends.top_n),
            history_capacity: env_parse("BEAUTY_HISTORY_CAPACITY")
                .unwrap_or(defaults.trends.history_capacity),
            cjk_code_point_threshold: env_parse("BEAUTY_CJK_THRESHOLD")
                .unwrap_or(defaults.trends.cjk_code_point_threshold),
            window_hours: env_parse("BEAUTY_WINDOW_HOURS").unwrap_or(defaults.trends.window_hours),
        };

        let sqlite_path = std::env::var("BEAUTY_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database.sqlite_path);

        let report_dir = std::env::var("BEAUTY_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.reports.output_dir);

        let interval_hours =
            env_parse("BEAUTY_INTERVAL_HOURS").unwrap_or(defaults.schedule.interval_hours);

        let watch_keywords = std::env::var("BEAUTY_WATCH_KEYWORDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.ingest.watch_keywords);

        let level = std::env::var("BEAUTY_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("BEAUTY_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Self {
            trends,
            database: DatabaseConfig { sqlite_path },
            reports: ReportConfig {
                output_dir: report_dir,
                enabled: defaults.reports.enabled,
            },
            schedule: ScheduleConfig {
                interval_hours,
                run_on_start: defaults.schedule.run_on_start,
            },
            ingest: IngestConfig { watch_keywords },
            logging: LoggingConfig { level, format },
        }
    }

    /// Load configuration from a TOML file
    ///
    /// A missing file is reported as [`Error::ConfigurationMissing`]; sections
    /// absent from the file take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigurationMissing(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.trends.top_n == 0 {
            return Err(Error::config("top_n must be greater than 0"));
        }

        if self.trends.history_capacity == 0 {
            return Err(Error::config("history_capacity must be greater than 0"));
        }

        if self.trends.window_hours == 0 || self.trends.window_hours > MAX_HOURS {
            return Err(Error::config(format!(
                "window_hours must be between 1 and {MAX_HOURS}"
            )));
        }

        if self.schedule.interval_hours == 0 || self.schedule.interval_hours > MAX_HOURS {
            return Err(Error::config(format!(
                "interval_hours must be between 1 and {MAX_HOURS}"
            )));
        }

        Ok(())
    }

    /// Get the store look-back window
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        self.trends.window()
    }
}

impl TrendConfig {
    /// Look-back window, saturating at the largest representable duration
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        i64::try_from(self.window_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trends.min_mentions, 5);
        assert_eq!(config.trends.top_n, 20);
        assert_eq!(config.trends.history_capacity, 100);
        assert_eq!(config.trends.cjk_code_point_threshold, 1000);
    }

    #[test]
    fn test_invalid_top_n() {
        let mut config = Config::default();
        config.trends.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_conversion() {
        let config = Config::default();
        assert_eq!(config.window(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_oversized_hours_rejected() {
        let mut config = Config::default();
        config.trends.window_hours = 10_000_000_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert_eq!(config.window(), chrono::Duration::MAX);

        let mut config = Config::default();
        config.trends.window_hours = MAX_HOURS;
        assert!(config.validate().is_ok());

        config.schedule.interval_hours = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [trends]
            min_mentions = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.trends.min_mentions, 3);
        assert_eq!(config.trends.top_n, 20);
        assert_eq!(config.schedule.interval_hours, 6);
    }

    #[test]
    fn test_missing_file_is_configuration_missing() {
        let err = Config::from_file(Path::new("/nonexistent/beauty.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)));
    }
}
