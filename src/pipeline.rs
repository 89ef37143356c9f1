use crate::apis::{LofiScraper, RadionScraper, ShelterScraper};
use crate::app::ports::PageFetcher;
use crate::observability::metrics;
use crate::types::{Event, VenueScraper};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Result of a complete aggregation run
#[derive(Debug, Serialize)]
pub struct AggregationReport {
    /// Deduplicated upcoming events, sorted by date
    pub events: Vec<Event>,
    pub total_scraped: usize,
    pub unique: usize,
    pub failed_venues: Vec<String>,
}

/// Runs every venue scraper in turn and merges their events into one feed.
pub struct Aggregator {
    scrapers: Vec<Box<dyn VenueScraper>>,
}

impl Aggregator {
    pub fn new(scrapers: Vec<Box<dyn VenueScraper>>) -> Self {
        Self { scrapers }
    }

    /// Shelter, Radion and Lofi sharing one fetcher
    pub fn with_default_venues(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(vec![
            Box::new(ShelterScraper::new(fetcher.clone())),
            Box::new(RadionScraper::new(fetcher.clone())),
            Box::new(LofiScraper::new(fetcher)),
        ])
    }

    pub fn venue_names(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|s| s.venue_name()).collect()
    }

    /// Scrape all venues sequentially. A failing venue is logged and skipped.
    pub async fn scrape_all_venues(&self, now: NaiveDateTime) -> (Vec<Event>, Vec<String>) {
        let mut all_events = Vec::new();
        let mut failed = Vec::new();

        for scraper in &self.scrapers {
            let venue = scraper.venue_name();
            info!("Scraping {} ({})...", venue, scraper.venue_url());

            match scraper.scrape_events(now).await {
                Ok(events) => {
                    info!("Found {} events at {}", events.len(), venue);
                    metrics::venue::scrape_success(venue, events.len());
                    all_events.extend(events);
                }
                Err(e) => {
                    error!("Error scraping {}: {}", venue, e);
                    metrics::venue::scrape_error(venue);
                    failed.push(venue.to_string());
                }
            }
        }

        (all_events, failed)
    }

    /// Scrape, deduplicate and keep the events in `[now, now + window_days]`
    #[instrument(skip(self))]
    pub async fn run(&self, now: NaiveDateTime, window_days: i64) -> AggregationReport {
        let (scraped, failed_venues) = self.scrape_all_venues(now).await;
        let total_scraped = scraped.len();

        let unique = deduplicate(scraped);
        info!("Total unique events: {}", unique.len());
        metrics::aggregation::unique(unique.len());
        let unique_count = unique.len();

        let events = filter_upcoming(unique, window_days, now);
        info!("Upcoming events in the next {} days: {}", window_days, events.len());
        metrics::aggregation::upcoming(events.len());

        AggregationReport {
            events,
            total_scraped,
            unique: unique_count,
            failed_venues,
        }
    }
}

/// Keep the first event per identity key, preserving first-seen order
pub fn deduplicate(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert(event.identity_key()))
        .collect()
}

/// `now + window_days`, saturating at the representable range
fn window_cutoff(now: NaiveDateTime, window_days: i64) -> NaiveDateTime {
    Duration::try_days(window_days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(if window_days < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}

/// Events with `now <= date <= now + window_days`, sorted ascending by date.
/// Both bounds are inclusive; ties keep their input order.
pub fn filter_upcoming(events: Vec<Event>, window_days: i64, now: NaiveDateTime) -> Vec<Event> {
    let cutoff = window_cutoff(now, window_days);

    let mut upcoming: Vec<Event> = events
        .into_iter()
        .filter(|event| event.date >= now && event.date <= cutoff)
        .collect();
    upcoming.sort_by_key(|event| event.date);
    upcoming
}
