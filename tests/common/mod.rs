#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;
use techno_scraper::app::ports::PageFetcher;
use techno_scraper::error::{Result, ScraperError};
use techno_scraper::types::{Event, VenueScraper};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Serves canned pages by URL and records every request
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned()
    }
}

/// Returns a fixed list of events
pub struct FixedScraper {
    pub venue: &'static str,
    pub events: Vec<Event>,
}

#[async_trait]
impl VenueScraper for FixedScraper {
    fn venue_name(&self) -> &'static str {
        self.venue
    }

    fn venue_url(&self) -> &'static str {
        "https://example.com"
    }

    async fn scrape_events(&self, _now: NaiveDateTime) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}

/// Always fails
pub struct BrokenScraper;

#[async_trait]
impl VenueScraper for BrokenScraper {
    fn venue_name(&self) -> &'static str {
        "Broken"
    }

    fn venue_url(&self) -> &'static str {
        "https://broken.example.com"
    }

    async fn scrape_events(&self, _now: NaiveDateTime) -> Result<Vec<Event>> {
        Err(ScraperError::Venue {
            venue: "Broken".to_string(),
            message: "markup changed".to_string(),
        })
    }
}

pub fn event(venue: &str, name: &str, date: NaiveDateTime) -> Event {
    Event::new(venue, format!("https://{}.example.com", venue.to_lowercase()), name, date)
}
