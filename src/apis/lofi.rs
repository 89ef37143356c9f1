use crate::apis::html::{
    absolute_url, compile_patterns, element_text, first_capture, first_match, first_text,
    selector, truncate_chars, with_listed_start_time,
};
use crate::app::ports::PageFetcher;
use crate::classifier::filter_techno_events;
use crate::constants::{LOFI_URL, LOFI_VENUE_NAME, MAX_ARTISTS, UNKNOWN_EVENT_NAME};
use crate::error::Result;
use crate::parser::resolve_event_date;
use crate::types::{Event, VenueScraper};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

const MAX_CONTAINERS: usize = 20;
const MAX_FALLBACK_LINKS: usize = 15;
const MAX_NAME_CHARS: usize = 100;

const CONTAINER_SELECTORS: &[&str] = &[
    r#"article[class*="event"]"#,
    r#"div[class*="event-item"], div[class*="event-card"]"#,
    r#"li[class*="event"]"#,
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5"];

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(\d{1,2}\s+\w+\s+\d{4})",
        r"(\w+\s+\d{1,2},?\s+\d{4})",
        r"(\d{1,2}[./]\d{1,2}[./]\d{2,4})",
        r"(\d{1,2}\s+\w+)",
    ])
});

static LINK_DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[r"(\d{1,2}\s+\w+\s+\d{4}|\w+\s+\d{1,2},?\s+\d{4})"])
});

// "Lofi presents X", "Y invites X", "Series: X"
static LINEUP_IN_NAME: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)presents?\s+(.+?)(?:\s+\||$)",
        r"(?i)invites?\s+(.+?)(?:\s+\||$)",
        r":\s*(.+?)(?:\s+\||$)",
    ])
});

static ARTIST_SEPARATOR: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\s*[,&]\s*|\s+(?i:b2b)\s+|\s+x\s+").ok());

static AGE_LIMIT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)\+").ok());

pub struct LofiScraper {
    fetcher: Arc<dyn PageFetcher>,
}

fn events_url() -> String {
    format!("{LOFI_URL}/events/")
}

/// Artist names embedded in an event title, capped at `MAX_ARTISTS`
pub fn artists_from_name(name: &str) -> Vec<String> {
    let Some(separator) = ARTIST_SEPARATOR.as_ref() else {
        return Vec::new();
    };
    let Some(lineup) = first_capture(name, &LINEUP_IN_NAME) else {
        return Vec::new();
    };

    separator
        .split(&lineup)
        .map(str::trim)
        .filter(|artist| !artist.is_empty())
        .map(str::to_string)
        .take(MAX_ARTISTS)
        .collect()
}

impl LofiScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn extract_listing_events(html: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
        let document = Html::parse_document(html);

        let mut containers: Vec<ElementRef<'_>> = Vec::new();
        for css in CONTAINER_SELECTORS {
            let sel = selector(css)?;
            containers = document.select(&sel).take(MAX_CONTAINERS).collect();
            if !containers.is_empty() {
                break;
            }
        }

        if containers.is_empty() {
            info!("No event containers on {} listing, reading event links", LOFI_VENUE_NAME);
            return Self::extract_link_events(&document, now);
        }
        info!("Found {} event containers", containers.len());

        let mut events = Vec::new();
        for container in containers {
            match Self::parse_container(&container, now) {
                Ok(event) => events.push(event),
                Err(e) => error!("Error parsing {} container: {}", LOFI_VENUE_NAME, e),
            }
        }
        Ok(events)
    }

    fn parse_container(container: &ElementRef<'_>, now: NaiveDateTime) -> Result<Event> {
        let text = element_text(container);

        let mut name = None;
        for heading in HEADINGS {
            name = first_text(container, heading)?;
            if name.is_some() {
                break;
            }
        }
        let name = match name {
            Some(name) => name,
            None => first_text(container, r#"[class*="title"], [class*="name"]"#)?
                .unwrap_or_else(|| UNKNOWN_EVENT_NAME.to_string()),
        };

        let fragment = match first_text(
            container,
            r#"[class*="date"], [class*="when"], [class*="time"]"#,
        )? {
            Some(date_text) => Some(date_text),
            None => first_capture(&text, &DATE_PATTERNS),
        };
        let date = match fragment.as_deref() {
            Some(fragment) => resolve_event_date(fragment, now),
            None => now,
        };
        let date = with_listed_start_time(date, &text, fragment.as_deref());

        let url = first_match(container, "a[href]")?
            .and_then(|link| link.value().attr("href"))
            .map(|href| absolute_url(LOFI_URL, href));

        let location = first_text(
            container,
            r#"[class*="location"], [class*="venue"], [class*="room"]"#,
        )?;
        let age = AGE_LIMIT
            .as_ref()
            .and_then(|regex| regex.captures(&text))
            .and_then(|caps| caps.get(1))
            .map(|m| format!("{}+", m.as_str()));

        let mut details = Vec::new();
        if let Some(location) = location {
            details.push(format!("Location: {location}"));
        }
        if let Some(age) = age {
            details.push(format!("Age: {age}"));
        }

        Ok(Event {
            url,
            artists: artists_from_name(&name),
            description: (!details.is_empty()).then(|| details.join(" | ")),
            ..Event::new(LOFI_VENUE_NAME, LOFI_URL, name, date)
        })
    }

    fn extract_link_events(document: &Html, now: NaiveDateTime) -> Result<Vec<Event>> {
        let anchors = selector("a[href]")?;
        let listing = events_url();

        let mut events = Vec::new();
        for anchor in document.select(&anchors) {
            if events.len() >= MAX_FALLBACK_LINKS {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !(href.contains("/event/") || href.contains("/events/")) {
                continue;
            }
            let url = absolute_url(LOFI_URL, href);
            if url == listing || href == "/events/" {
                continue;
            }

            let name = element_text(&anchor);
            if name.is_empty() {
                debug!("Skipping link without text: {}", url);
                continue;
            }

            let context = anchor
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| element_text(&parent))
                .unwrap_or_default();
            let date = match first_capture(&context, &LINK_DATE_PATTERNS) {
                Some(fragment) => resolve_event_date(&fragment, now),
                None => now,
            };

            events.push(Event {
                url: Some(url),
                ..Event::new(LOFI_VENUE_NAME, LOFI_URL, truncate_chars(&name, MAX_NAME_CHARS), date)
            });
        }
        Ok(events)
    }
}

#[async_trait]
impl VenueScraper for LofiScraper {
    fn venue_name(&self) -> &'static str {
        LOFI_VENUE_NAME
    }

    fn venue_url(&self) -> &'static str {
        LOFI_URL
    }

    #[instrument(skip(self))]
    async fn scrape_events(&self, now: NaiveDateTime) -> Result<Vec<Event>> {
        info!("Scraping {} events...", LOFI_VENUE_NAME);

        let Some(listing) = self.fetcher.fetch_page(&events_url()).await else {
            error!("Failed to fetch {} events page", LOFI_VENUE_NAME);
            return Ok(Vec::new());
        };

        let techno = filter_techno_events(Self::extract_listing_events(&listing, now)?);
        info!("Found {} techno events at {}", techno.len(), LOFI_VENUE_NAME);
        Ok(techno)
    }
}
