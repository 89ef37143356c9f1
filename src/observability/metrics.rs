//! Run counters for the aggregator
//!
//! Everything goes through the `metrics` facade. No exporter is installed by the
//! binary, so these calls are no-ops unless an embedding application installs a
//! recorder.

use std::fmt;

/// All metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch metrics
    FetchAttempts,
    FetchFailures,
    FetchExhausted,

    // Venue metrics
    VenueScrapeSuccess,
    VenueScrapeError,
    VenueEventsScraped,

    // Aggregation metrics
    EventsUnique,
    EventsUpcoming,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchAttempts => "techno_fetch_attempts_total",
            MetricName::FetchFailures => "techno_fetch_failures_total",
            MetricName::FetchExhausted => "techno_fetch_exhausted_total",

            MetricName::VenueScrapeSuccess => "techno_venue_scrape_success_total",
            MetricName::VenueScrapeError => "techno_venue_scrape_error_total",
            MetricName::VenueEventsScraped => "techno_venue_events_scraped_total",

            MetricName::EventsUnique => "techno_events_unique_total",
            MetricName::EventsUpcoming => "techno_events_upcoming_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub mod fetch {
    use super::MetricName;

    pub fn attempt() {
        ::metrics::counter!(MetricName::FetchAttempts.as_str()).increment(1);
    }

    pub fn failure() {
        ::metrics::counter!(MetricName::FetchFailures.as_str()).increment(1);
    }

    pub fn exhausted() {
        ::metrics::counter!(MetricName::FetchExhausted.as_str()).increment(1);
    }
}

pub mod venue {
    use super::MetricName;

    pub fn scrape_success(venue: &str, events: usize) {
        ::metrics::counter!(MetricName::VenueScrapeSuccess.as_str(), "venue" => venue.to_string())
            .increment(1);
        ::metrics::counter!(MetricName::VenueEventsScraped.as_str(), "venue" => venue.to_string())
            .increment(events as u64);
    }

    pub fn scrape_error(venue: &str) {
        ::metrics::counter!(MetricName::VenueScrapeError.as_str(), "venue" => venue.to_string())
            .increment(1);
    }
}

pub mod aggregation {
    use super::MetricName;

    pub fn unique(count: usize) {
        ::metrics::counter!(MetricName::EventsUnique.as_str()).increment(count as u64);
    }

    pub fn upcoming(count: usize) {
        ::metrics::counter!(MetricName::EventsUpcoming.as_str()).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [
            MetricName::FetchAttempts,
            MetricName::VenueScrapeError,
            MetricName::EventsUpcoming,
        ] {
            assert!(name.to_string().starts_with("techno_"));
            assert!(name.as_str().ends_with("_total"));
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        fetch::attempt();
        venue::scrape_success("Shelter", 3);
        aggregation::upcoming(2);
    }
}
