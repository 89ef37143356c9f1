use anyhow::Context;
use chrono::Local;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use techno_scraper::config::{Config, DEFAULT_CONFIG_PATH};
use techno_scraper::constants::MAX_WINDOW_DAYS;
use techno_scraper::infra::http_client::ReqwestFetcher;
use techno_scraper::logging;
use techno_scraper::output::{save_events_json, send_email};
use techno_scraper::pipeline::Aggregator;
use techno_scraper::types::Event;

/// Events printed in the console summary
const SUMMARY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Email,
    Both,
}

#[derive(Parser)]
#[command(name = "techno_scraper")]
#[command(about = "Amsterdam Techno Event Aggregator")]
#[command(version)]
struct Cli {
    /// Email address to send results to
    #[arg(long)]
    email: Option<String>,

    /// Number of days to look ahead [default: 7, or [aggregator] days in the config file]
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_WINDOW_DAYS))]
    days: Option<i64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// JSON output filename
    #[arg(long, default_value = "events.json")]
    json_file: PathBuf,

    /// Optional TOML file with fetch and aggregation settings
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn print_summary(events: &[Event], days: i64) {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("TECHNO EVENTS SUMMARY - Next {days} days");
    println!("{rule}");

    for event in events.iter().take(SUMMARY_LIMIT) {
        println!("\n📅 {}", event.date.format("%a %b %d, %H:%M"));
        println!("📍 {}: {}", event.venue, event.name);
        if !event.artists.is_empty() {
            let shown: Vec<&str> = event.artists.iter().take(3).map(String::as_str).collect();
            println!("🎧 {}", shown.join(", "));
        }
    }

    if events.len() > SUMMARY_LIMIT {
        println!("\n... and {} more events", events.len() - SUMMARY_LIMIT);
    }
    println!("\n{rule}");
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let days = cli.days.unwrap_or(config.aggregator.days);

    let fetcher = ReqwestFetcher::new(config.fetch.clone()).context("building HTTP client")?;
    let aggregator = Aggregator::with_default_venues(Arc::new(fetcher));

    info!(
        "Starting techno event aggregation for {}",
        aggregator.venue_names().join(", ")
    );
    let now = Local::now().naive_local();
    let report = aggregator.run(now, days).await;
    if !report.failed_venues.is_empty() {
        warn!("Venues that failed: {}", report.failed_venues.join(", "));
    }
    let events = report.events;

    if matches!(cli.output, OutputFormat::Json | OutputFormat::Both) {
        save_events_json(&events, &cli.json_file)
            .with_context(|| format!("writing {}", cli.json_file.display()))?;
    }

    if matches!(cli.output, OutputFormat::Email | OutputFormat::Both) {
        match cli.email.clone() {
            Some(recipient) => {
                if std::env::var_os("GITHUB_ACTIONS").is_some() {
                    info!("Running in GitHub Actions, using secrets for SMTP");
                }
                let to_send = events.clone();
                let target = recipient.clone();
                let sent =
                    tokio::task::spawn_blocking(move || send_email(&to_send, &target, None))
                        .await
                        .context("email task panicked")?;
                match sent {
                    Ok(()) => info!("Email sent to {}", recipient),
                    Err(e) => error!("Failed to send email: {}", e),
                }
            }
            None => warn!("Email output requested but no --email address given"),
        }
    }

    print_summary(&events, days);

    Ok(if events.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
