use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single event listing as extracted from a venue site.
///
/// `date` is always fully resolved by the date normalizer before the record is built.
/// Equality is field-exact; deduplication goes through [`Event::identity_key`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub venue: String,
    pub venue_url: String,
    pub name: String,
    pub date: NaiveDateTime,
    pub url: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

/// Identity of an event for deduplication: same venue, same name ignoring case,
/// same calendar day. Time-of-day and every other field are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub venue: String,
    pub folded_name: String,
    pub day: NaiveDate,
}

impl Event {
    pub fn new(
        venue: impl Into<String>,
        venue_url: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            venue: venue.into(),
            venue_url: venue_url.into(),
            name: name.into(),
            date,
            url: None,
            artists: Vec::new(),
            price: None,
            description: None,
        }
    }

    pub fn identity_key(&self) -> EventKey {
        EventKey {
            venue: self.venue.clone(),
            folded_name: self.name.to_lowercase(),
            day: self.date.date(),
        }
    }
}

/// Capability shared by every venue: fetch its pages and extract candidate events.
///
/// `now` is the reference instant for resolving partial and relative dates.
#[async_trait::async_trait]
pub trait VenueScraper: Send + Sync {
    /// Short venue identifier, also used as `Event::venue`
    fn venue_name(&self) -> &'static str;

    fn venue_url(&self) -> &'static str;

    /// Fetch and extract the venue's techno events
    async fn scrape_events(&self, now: NaiveDateTime) -> Result<Vec<Event>>;
}
