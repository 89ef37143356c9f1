use crate::apis::html::{
    absolute_url, compile_patterns, element_text, first_capture, first_match, first_text,
    lineup_artists, meta_description, selector, truncate_chars, with_listed_start_time,
};
use crate::app::ports::PageFetcher;
use crate::classifier::filter_techno_events;
use crate::constants::{RADION_URL, RADION_VENUE_NAME, UNKNOWN_EVENT_NAME};
use crate::error::Result;
use crate::parser::resolve_event_date;
use crate::types::{Event, VenueScraper};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const MAX_CONTAINERS: usize = 15;
const MAX_DETAIL_LINKS: usize = 10;
const MAX_NAME_CHARS: usize = 100;

/// Tried in order; the first group that matches anything wins
const CONTAINER_SELECTORS: &[&str] = &[
    r#"article[class*="event"], article[class*="card"]"#,
    r#"div[class*="event"], div[class*="card"], div[class*="item"]"#,
    r#"a[class*="event"], a[class*="card"]"#,
];

const DATE_ELEMENT: &str = r#"[class*="date"], [class*="when"], [class*="time"]"#;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(\d{1,2}\s+\w+\s+\d{4}|\w+\s+\d{1,2},?\s+\d{4}|\d{1,2}[./]\d{1,2}[./]\d{2,4})",
        r"(\d{1,2}[\s/-]\w+)",
    ])
});

static DETAIL_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/event/|/program/").ok());

pub struct RadionScraper {
    fetcher: Arc<dyn PageFetcher>,
}

fn program_url() -> String {
    format!("{RADION_URL}/program")
}

impl RadionScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Events from the card containers of the program page
    pub fn extract_program_events(html: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
        let document = Html::parse_document(html);

        let mut containers: Vec<ElementRef<'_>> = Vec::new();
        for css in CONTAINER_SELECTORS {
            let sel = selector(css)?;
            containers = document.select(&sel).take(MAX_CONTAINERS).collect();
            if !containers.is_empty() {
                debug!("Matched {} containers with {}", containers.len(), css);
                break;
            }
        }
        info!("Found {} potential event containers", containers.len());

        let mut events = Vec::new();
        for container in containers {
            match Self::parse_container(&container, now) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => debug!("Skipping container without a name"),
                Err(e) => error!("Error parsing {} container: {}", RADION_VENUE_NAME, e),
            }
        }
        Ok(events)
    }

    fn parse_container(container: &ElementRef<'_>, now: NaiveDateTime) -> Result<Option<Event>> {
        let text = element_text(container);

        let name = match first_text(container, "h2, h3, h4")? {
            Some(name) => name,
            None => match first_text(
                container,
                r#"[class*="title"], [class*="name"], [class*="heading"]"#,
            )? {
                Some(name) => name,
                None => truncate_chars(&text, MAX_NAME_CHARS),
            },
        };
        if name.is_empty() {
            return Ok(None);
        }

        let fragment = match first_text(container, DATE_ELEMENT)? {
            Some(date_text) => Some(date_text),
            None => first_capture(&text, &DATE_PATTERNS),
        };
        let date = match fragment.as_deref() {
            Some(fragment) => resolve_event_date(fragment, now),
            None => now,
        };
        let date = with_listed_start_time(date, &text, fragment.as_deref());

        let href = if container.value().name() == "a" {
            container.value().attr("href").map(str::to_string)
        } else {
            first_match(container, "a[href]")?
                .and_then(|link| link.value().attr("href"))
                .map(str::to_string)
        };

        Ok(Some(Event {
            url: href.map(|href| absolute_url(RADION_URL, &href)),
            description: first_text(
                container,
                r#"[class*="category"], [class*="type"], [class*="tag"]"#,
            )?,
            ..Event::new(RADION_VENUE_NAME, RADION_URL, name, date)
        }))
    }

    /// Detail page links used when the program page has no recognisable cards
    pub fn extract_detail_links(html: &str) -> Result<Vec<String>> {
        let Some(pattern) = DETAIL_LINK.as_ref() else {
            return Ok(Vec::new());
        };
        let document = Html::parse_document(html);
        let anchors = selector("a[href]")?;

        let mut links: Vec<String> = Vec::new();
        for href in document
            .select(&anchors)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| pattern.is_match(href))
        {
            let url = absolute_url(RADION_URL, href);
            if !links.contains(&url) {
                links.push(url);
            }
            if links.len() >= MAX_DETAIL_LINKS {
                break;
            }
        }
        Ok(links)
    }

    pub fn parse_event_page(html: &str, event_url: &str, now: NaiveDateTime) -> Result<Event> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let name = match first_text(&root, "h1")? {
            Some(name) => name,
            None => first_text(&root, "title")?.unwrap_or_else(|| UNKNOWN_EVENT_NAME.to_string()),
        };

        let fragment = first_text(&root, DATE_ELEMENT)?;
        let date = match fragment.as_deref() {
            Some(fragment) => {
                let date = resolve_event_date(fragment, now);
                with_listed_start_time(date, fragment, None)
            }
            None => now,
        };

        Ok(Event {
            url: Some(event_url.to_string()),
            artists: lineup_artists(&document, "li, p, span, div", |len| len > 10 && len < 50)?,
            description: meta_description(&document)?,
            ..Event::new(RADION_VENUE_NAME, RADION_URL, name, date)
        })
    }

    async fn scrape_detail_pages(&self, program: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
        let links = Self::extract_detail_links(program)?;
        info!("Falling back to {} detail pages", links.len());

        let mut events = Vec::new();
        for link in links {
            let Some(page) = self.fetcher.fetch_page(&link).await else {
                warn!("Skipping {}: page could not be fetched", link);
                continue;
            };
            match Self::parse_event_page(&page, &link, now) {
                Ok(event) => events.push(event),
                Err(e) => error!("Error parsing event page {}: {}", link, e),
            }
        }
        Ok(events)
    }
}

#[async_trait]
impl VenueScraper for RadionScraper {
    fn venue_name(&self) -> &'static str {
        RADION_VENUE_NAME
    }

    fn venue_url(&self) -> &'static str {
        RADION_URL
    }

    #[instrument(skip(self))]
    async fn scrape_events(&self, now: NaiveDateTime) -> Result<Vec<Event>> {
        info!("Scraping {} events...", RADION_VENUE_NAME);

        let url = program_url();
        let Some(program) = self.fetcher.fetch_page(&url).await else {
            error!("Failed to fetch {} program page", RADION_VENUE_NAME);
            return Ok(Vec::new());
        };

        let mut events = Self::extract_program_events(&program, now)?;
        if events.is_empty() {
            events = self.scrape_detail_pages(&program, now).await?;
        }

        let techno = filter_techno_events(events);
        info!("Found {} techno events at {}", techno.len(), RADION_VENUE_NAME);
        Ok(techno)
    }
}
