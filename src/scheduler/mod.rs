//! Recurring trend runs
//!
//! The core only exposes [`TrendMonitor::run_once`]; this trigger is one way
//! to call it periodically. Runs never overlap: each one is awaited before
//! the next tick is taken, and ticks missed during a long run are skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::analytics::TrendMonitor;
use crate::config::ScheduleConfig;
use crate::storage::ReportSink;

/// Trigger timing
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    /// Time between runs
    pub interval: Duration,

    /// Run immediately instead of waiting for the first interval
    pub run_on_start: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

impl From<&ScheduleConfig> for TriggerConfig {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_hours.saturating_mul(3600)),
            run_on_start: config.run_on_start,
        }
    }
}

/// Periodically runs the trend monitor until stopped
pub struct TrendTrigger {
    config: TriggerConfig,
    monitor: Arc<TrendMonitor>,
    sink: Option<Arc<dyn ReportSink>>,
    shutdown: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TrendTrigger {
    /// Create a trigger; `sink` receives every snapshot when present
    pub fn new(
        config: TriggerConfig,
        monitor: Arc<TrendMonitor>,
        sink: Option<Arc<dyn ReportSink>>,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        Self {
            config,
            monitor,
            sink,
            shutdown,
            shutdown_rx,
        }
    }

    /// Run until [`stop`](Self::stop) is called
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // The first tick completes immediately
        if !self.config.run_on_start {
            interval.tick().await;
        }

        tracing::info!(interval = ?self.config.interval, "Trend monitoring started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.execute().await;
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Trend monitoring stopped");
                    break;
                }
            }
        }
    }

    /// Execute a single run on the blocking pool
    async fn execute(&self) {
        let monitor = Arc::clone(&self.monitor);
        let sink = self.sink.clone();

        let result = tokio::task::spawn_blocking(move || match sink {
            Some(sink) => monitor.run_and_report(sink.as_ref()),
            None => monitor.run_once(),
        })
        .await;

        match result {
            Ok(snapshot) => {
                tracing::info!(trends = snapshot.len(), "Scheduled trend run completed")
            }
            Err(e) => tracing::error!(error = %e, "Scheduled trend run failed"),
        }
    }

    /// Stop the trigger
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}
