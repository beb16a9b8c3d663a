use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beauty_trends::analytics::TrendMonitor;
use beauty_trends::config::Config;
use beauty_trends::ingest::{ingest_feed_entries, ingest_social_batches, FeedEntry, SocialBatch};
use beauty_trends::scheduler::{TrendTrigger, TriggerConfig};
use beauty_trends::storage::report::CHART_TERMS;
use beauty_trends::storage::{
    create_sqlite_store, export_articles, text_chart, JsonReportWriter, ReportSink, TextStore,
    EXPORT_LIMIT,
};
use beauty_trends::ItemCategory;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "beauty_trends.toml";

/// Social keywords listed by `stats`
const TOP_KEYWORDS: usize = 10;

#[derive(Parser)]
#[command(
    name = "beauty-trends",
    version,
    about = "Beauty-industry trend monitor for feed articles and social posts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract trends from the last window once and print them
    Run {
        /// Print the snapshot as JSON instead of a chart
        #[arg(long, default_value = "false")]
        json: bool,

        /// Do not write report files
        #[arg(long, default_value = "false")]
        no_report: bool,
    },

    /// Extract trends on a fixed interval until interrupted
    Watch {
        /// Override hours between runs
        #[arg(long)]
        interval_hours: Option<u64>,
    },

    /// Import collector output into the store
    Import {
        /// JSON array of feed entries
        #[arg(long)]
        feed: Option<PathBuf>,

        /// JSON array of social batches
        #[arg(long)]
        social: Option<PathBuf>,
    },

    /// Export the newest feed articles to CSV
    Export {
        /// Output file
        #[arg(long, default_value = "beauty_articles_latest.csv")]
        csv: PathBuf,

        /// Number of articles to export
        #[arg(long, default_value_t = EXPORT_LIMIT)]
        limit: usize,
    },

    /// Show stored item counts and the most searched social keywords
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("Beauty trend monitor starting");

    match cli.command {
        Commands::Run { json, no_report } => {
            tracing::info!(json = %json, no_report = %no_report, "Starting run command");
            run(&config, json, no_report)?;
        }

        Commands::Watch { interval_hours } => {
            tracing::info!(interval_hours = ?interval_hours, "Starting watch command");
            watch(config, interval_hours).await?;
        }

        Commands::Import { feed, social } => {
            tracing::info!(feed = ?feed, social = ?social, "Starting import command");
            import(&config, feed, social)?;
        }

        Commands::Export { csv, limit } => {
            tracing::info!(path = %csv.display(), limit = limit, "Starting export command");
            export(&config, &csv, limit)?;
        }

        Commands::Stats => {
            stats(&config)?;
        }
    }

    tracing::info!("Beauty trend monitor completed successfully");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load {DEFAULT_CONFIG_FILE}"))
        }
        None => Ok(Config::from_env()),
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("beauty_trends=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("beauty_trends={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn open_monitor(config: &Config, writer: Option<&JsonReportWriter>) -> Result<TrendMonitor> {
    let store = create_sqlite_store(&config.database.sqlite_path)
        .context("Failed to open text store")?;
    let mut monitor = TrendMonitor::new(store, &config.trends);

    if let Some(writer) = writer {
        match writer.load_history(config.trends.history_capacity) {
            Ok(Some(history)) => {
                tracing::info!(snapshots = history.len(), "Restored trend history");
                monitor = monitor.with_history(history);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable trend history"),
        }
    }

    Ok(monitor)
}

fn report_writer(config: &Config) -> Result<Option<JsonReportWriter>> {
    if !config.reports.enabled {
        return Ok(None);
    }
    let writer = JsonReportWriter::new(&config.reports.output_dir)
        .context("Failed to create report directory")?;
    Ok(Some(writer))
}

fn run(config: &Config, json: bool, no_report: bool) -> Result<()> {
    let writer = if no_report { None } else { report_writer(config)? };
    let monitor = open_monitor(config, writer.as_ref())?;

    let snapshot = match &writer {
        Some(writer) => monitor.run_and_report(writer),
        None => monitor.run_once(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Beauty trends at {}", snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("================================");
    if snapshot.is_empty() {
        println!(
            "No terms reached {} mentions in the last {} hours.",
            config.trends.min_mentions, config.trends.window_hours
        );
    } else {
        print!("{}", text_chart(&snapshot, CHART_TERMS, 40));
    }

    Ok(())
}

async fn watch(mut config: Config, interval_hours: Option<u64>) -> Result<()> {
    if let Some(hours) = interval_hours {
        config.schedule.interval_hours = hours;
        config.validate().context("Invalid interval")?;
    }

    let writer = report_writer(&config)?;
    let monitor = Arc::new(open_monitor(&config, writer.as_ref())?);
    let sink = writer.map(|w| Arc::new(w) as Arc<dyn ReportSink>);

    let trigger = Arc::new(TrendTrigger::new(
        TriggerConfig::from(&config.schedule),
        Arc::clone(&monitor),
        sink,
    ));

    let runner = Arc::clone(&trigger);
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Interrupt received, stopping");
    trigger.stop();
    handle.await.context("Trend trigger task failed")?;

    if let Some(latest) = monitor.latest() {
        tracing::info!(
            timestamp = %latest.timestamp,
            trends = latest.len(),
            top = ?latest.trends.first(),
            "Last snapshot before shutdown"
        );
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn import(config: &Config, feed: Option<PathBuf>, social: Option<PathBuf>) -> Result<()> {
    if feed.is_none() && social.is_none() {
        anyhow::bail!("Nothing to import: pass --feed and/or --social");
    }

    let store = create_sqlite_store(&config.database.sqlite_path)
        .context("Failed to open text store")?;

    if let Some(path) = feed {
        let entries: Vec<FeedEntry> = read_json(&path)?;
        let stats = ingest_feed_entries(store.as_ref(), &entries, &config.ingest.watch_keywords);
        println!(
            "Feed: {} new, {} duplicate, {} failed",
            stats.inserted, stats.duplicates, stats.failed
        );
    }

    if let Some(path) = social {
        let batches: Vec<SocialBatch> = read_json(&path)?;
        let stats = ingest_social_batches(store.as_ref(), &batches);
        println!(
            "Social: {} new, {} duplicate, {} failed",
            stats.inserted, stats.duplicates, stats.failed
        );
    }

    Ok(())
}

fn export(config: &Config, path: &Path, limit: usize) -> Result<()> {
    let store = create_sqlite_store(&config.database.sqlite_path)
        .context("Failed to open text store")?;

    let written = export_articles(store.as_ref(), path, limit)
        .with_context(|| format!("Failed to export articles to {}", path.display()))?;
    println!("Exported {written} articles to {}", path.display());

    Ok(())
}

fn stats(config: &Config) -> Result<()> {
    let store = create_sqlite_store(&config.database.sqlite_path)
        .context("Failed to open text store")?;

    println!("Store: {}", config.database.sqlite_path.display());
    for category in ItemCategory::all() {
        let total = store.count(category)?;
        let recent = store.query_recent(category, config.window())?.len();
        println!(
            "  {category:<8} {total} items ({recent} in the last {} hours)",
            config.trends.window_hours
        );
    }

    let keywords = store.keyword_volume(config.window(), TOP_KEYWORDS)?;
    if !keywords.is_empty() {
        println!();
        println!("Top social keywords (last {} hours)", config.trends.window_hours);
        for (rank, (keyword, posts)) in keywords.iter().enumerate() {
            println!("  {}. {keyword}: {posts} posts", rank + 1);
        }
    }

    Ok(())
}
