use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use pixie_events::config::Config;
use pixie_events::logging;
use pixie_events::metrics;
use pixie_events::scheduler::{RefreshReport, RefreshRunner};
use pixie_events::sources::{EventSource, JsonFileSource, MockSource};
use pixie_events::storage::{EventStore, InMemoryEventStore};
use pixie_events::{EventRecord, FilterCriteria, Stats, Status};

#[derive(Parser)]
#[command(name = "pixie_events")]
#[command(about = "Discover, deduplicate and classify events from listing platforms")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file (defaults to $PIXIE_CONFIG or config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// Candidate batch files (JSON arrays); mock listings are used when omitted
    #[arg(long = "batch")]
    batches: Vec<PathBuf>,

    /// City to discover events for
    #[arg(long)]
    city: Option<String>,

    /// Reconcile as of this day or RFC 3339 instant instead of the current time
    #[arg(long)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single reconciliation pass and print the change summary
    Refresh {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Refresh, then print the events matching the given filters
    List {
        #[command(flatten)]
        sources: SourceArgs,
        /// Case-insensitive search over name, venue and category
        #[arg(long)]
        text: Option<String>,
        /// upcoming, ongoing or expired
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        category: Option<String>,
        /// Listing platform, e.g. BookMyShow or District
        #[arg(long)]
        source: Option<String>,
        /// Only show events in the selected city
        #[arg(long)]
        only_city: bool,
    },
    /// Refresh, then print aggregate counts
    Stats {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Refresh periodically according to the [refresh] configuration
    Watch {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

fn parse_now(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    let Some(value) = value else {
        return Ok(Utc::now());
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("--now must be YYYY-MM-DD or RFC 3339, got '{}'", value))?;
    match day.and_hms_opt(0, 0, 0) {
        Some(midnight) => Ok(midnight.and_utc()),
        None => bail!("invalid --now value '{}'", value),
    }
}

fn build_sources(args: &SourceArgs, config: &Config) -> Vec<Arc<dyn EventSource>> {
    if !args.batches.is_empty() {
        return args
            .batches
            .iter()
            .map(|path| Arc::new(JsonFileSource::new(path)) as Arc<dyn EventSource>)
            .collect();
    }
    config
        .discovery
        .sources
        .iter()
        .map(|platform| {
            Arc::new(MockSource::new(
                platform,
                config.mock.events_per_source,
                config.mock.seed,
            )) as Arc<dyn EventSource>
        })
        .collect()
}

fn build_runner(args: &SourceArgs, config: &Config) -> (RefreshRunner, String) {
    let city = args
        .city
        .clone()
        .unwrap_or_else(|| config.discovery.default_city.clone());
    if !config.discovery.cities.contains(&city) {
        warn!("City '{}' is not in the configured city list", city);
    }
    let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
    let runner = RefreshRunner::new(store, build_sources(args, config), &city, &config.refresh);
    (runner, city)
}

fn print_report(report: &RefreshReport) {
    let summary = &report.summary;
    println!("\n📊 Reconciliation results:");
    println!("   Candidates fetched: {}", report.fetched_candidates);
    println!("   Added: {}", summary.added);
    println!("   Updated: {}", summary.updated);
    println!("   Unchanged: {}", summary.unchanged);
    println!("   Reclassified: {}", summary.reclassified);
    println!("   Expired in collection: {}", summary.expired_total);
    if !summary.has_changes() {
        println!("   ✅ Collection already up to date");
    }

    if !summary.rejected.is_empty() {
        println!("\n⚠️  Rejected candidates:");
        for rejected in &summary.rejected {
            println!(
                "   - #{} {}: {}",
                rejected.index,
                rejected.name.as_deref().unwrap_or("<unnamed>"),
                rejected.error
            );
        }
    }
    for source in &report.failed_sources {
        println!("❌ Source failed: {}", source);
    }
}

fn print_events(events: &[EventRecord]) {
    if events.is_empty() {
        println!("No events found");
        return;
    }
    println!(
        "{:<36} {:<10} {:<28} {:<12} {:<10} {:<8}",
        "Event Name", "Date", "Venue", "Category", "Platform", "Status"
    );
    for event in events {
        println!(
            "{:<36} {:<10} {:<28} {:<12} {:<10} {:<8}",
            event.name, event.date, event.venue, event.category, event.source, event.status
        );
    }
}

fn print_stats(stats: &Stats, city: &str) {
    println!("\n📈 {} events in collection", stats.total);
    for (status, count) in &stats.by_status {
        println!("   {:<9} {}", status, count);
    }
    println!("\n   By platform:");
    for (source, count) in &stats.by_source {
        println!("   {:<12} {}", source, count);
    }
    println!(
        "\n   {}: {} upcoming, {} ongoing, {} expired",
        city,
        stats.count(city, Status::Upcoming),
        stats.count(city, Status::Ongoing),
        stats.count(city, Status::Expired)
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Refresh { sources } => {
            println!("🔄 Refreshing events...");
            let (runner, _) = build_runner(&sources, &config);
            let report = runner.refresh_at(parse_now(sources.now.as_deref())?).await?;
            print_report(&report);
        }
        Commands::List {
            sources,
            text,
            status,
            category,
            source,
            only_city,
        } => {
            let (runner, city) = build_runner(&sources, &config);
            let report = runner.refresh_at(parse_now(sources.now.as_deref())?).await?;
            print_report(&report);

            let criteria = FilterCriteria {
                text,
                status,
                category,
                source,
                city: only_city.then_some(city),
            };
            let events = runner.store().filter(&criteria).await;
            println!();
            print_events(&events);
        }
        Commands::Stats { sources } => {
            let (runner, city) = build_runner(&sources, &config);
            runner.refresh_at(parse_now(sources.now.as_deref())?).await?;
            print_stats(&runner.store().stats().await, &city);
        }
        Commands::Watch { sources } => {
            if sources.now.is_some() {
                warn!("--now is ignored by watch, which always uses the current time");
            }
            let (runner, _) = build_runner(&sources, &config);
            info!(
                interval_secs = config.refresh.interval_secs,
                auto_update = config.refresh.auto_update,
                "Starting refresh loop"
            );
            println!("👀 Watching for event updates (Ctrl-C to stop)...");
            runner
                .run(&config.refresh, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;

            for entry in runner.store().activity().await.entries() {
                println!("   [{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.message);
            }
        }
    }
    Ok(())
}
