use crate::apis::html::{
    absolute_url, compile_patterns, document_text, first_capture, first_text,
    lineup_artists, meta_description, selector, with_listed_start_time,
};
use crate::app::ports::PageFetcher;
use crate::classifier::filter_techno_events;
use crate::constants::{SHELTER_URL, SHELTER_VENUE_NAME, UNKNOWN_EVENT_NAME};
use crate::error::Result;
use crate::parser::resolve_event_date;
use crate::types::{Event, VenueScraper};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Detail pages fetched per run
const MAX_EVENT_LINKS: usize = 10;

static EVENT_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/event/[^/]+/?$").ok());

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(\d{1,2}[./]\d{1,2}[./]\d{2,4})",
        r"(\w+\s+\d{1,2}\s*,?\s*\d{4})",
        r"(\d{1,2}\s+\w+\s+\d{4})",
    ])
});

/// Shelter lists events on its home page and keeps the details on one page per event.
pub struct ShelterScraper {
    fetcher: Arc<dyn PageFetcher>,
}

impl ShelterScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Absolute URLs of the event detail pages linked from the home page
    pub fn extract_event_links(html: &str) -> Result<Vec<String>> {
        let Some(pattern) = EVENT_LINK.as_ref() else {
            return Ok(Vec::new());
        };
        let document = Html::parse_document(html);
        let anchors = selector("a[href]")?;

        let mut links: Vec<String> = Vec::new();
        for anchor in document.select(&anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !pattern.is_match(href) {
                continue;
            }

            let url = if href.starts_with("http") {
                href.to_string()
            } else {
                absolute_url(SHELTER_URL, href.trim_end_matches('/'))
            };
            if !links.contains(&url) {
                links.push(url);
            }
            if links.len() >= MAX_EVENT_LINKS {
                break;
            }
        }

        Ok(links)
    }

    pub fn parse_event_page(html: &str, event_url: &str, now: NaiveDateTime) -> Result<Event> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let name = match first_text(&root, "h1")? {
            Some(title) => title,
            None => first_text(&root, "title")?.unwrap_or_else(|| UNKNOWN_EVENT_NAME.to_string()),
        };

        let page_text = document_text(&document);
        let fragment = first_capture(&page_text, &DATE_PATTERNS);
        let date = match fragment.as_deref() {
            Some(fragment) => resolve_event_date(fragment, now),
            None => {
                warn!("No date found on {}", event_url);
                now
            }
        };
        let date = with_listed_start_time(date, &page_text, fragment.as_deref());

        Ok(Event {
            url: Some(event_url.to_string()),
            artists: lineup_artists(&document, "li, p, span", |len| len < 50)?,
            description: meta_description(&document)?,
            ..Event::new(SHELTER_VENUE_NAME, SHELTER_URL, name, date)
        })
    }
}

#[async_trait]
impl VenueScraper for ShelterScraper {
    fn venue_name(&self) -> &'static str {
        SHELTER_VENUE_NAME
    }

    fn venue_url(&self) -> &'static str {
        SHELTER_URL
    }

    #[instrument(skip(self))]
    async fn scrape_events(&self, now: NaiveDateTime) -> Result<Vec<Event>> {
        info!("Scraping {} events...", SHELTER_VENUE_NAME);

        let Some(home) = self.fetcher.fetch_page(SHELTER_URL).await else {
            error!("Failed to fetch {} homepage", SHELTER_VENUE_NAME);
            return Ok(Vec::new());
        };

        let links = Self::extract_event_links(&home)?;
        info!("Found {} event links on {}", links.len(), SHELTER_VENUE_NAME);

        let mut events = Vec::new();
        for link in links {
            let Some(page) = self.fetcher.fetch_page(&link).await else {
                warn!("Skipping {}: page could not be fetched", link);
                continue;
            };
            match Self::parse_event_page(&page, &link, now) {
                Ok(event) => events.push(event),
                Err(e) => error!("Error parsing event {}: {}", link, e),
            }
        }

        let techno = filter_techno_events(events);
        info!("Found {} techno events at {}", techno.len(), SHELTER_VENUE_NAME);
        Ok(techno)
    }
}
