//! Markup helpers shared by the venue scrapers.

use crate::constants::MAX_ARTISTS;
use crate::error::{Result, ScraperError};
use crate::parser::extract_time_range;
use chrono::{NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::error;

/// How far above the "line-up" label we look for the list of names
const LINEUP_MAX_CLIMB: usize = 3;

static LINEUP_LABEL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)line[\s-]?up").ok());

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_string(),
        message: format!("{e:?}"),
    })
}

/// Compile a fixed pattern list, logging (and dropping) any pattern that fails
pub fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                error!("Invalid pattern {}: {}", pattern, e);
                None
            }
        })
        .collect()
}

/// Text content of an element with runs of whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn document_text(document: &Html) -> String {
    element_text(&document.root_element())
}

pub fn first_match<'a>(scope: &ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(scope.select(&selector(css)?).next())
}

/// Text of the first element matching `css` that has any
pub fn first_text(scope: &ElementRef<'_>, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(scope
        .select(&sel)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty()))
}

pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href)
    }
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// First capture of the first pattern that matches
pub fn first_capture(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

pub fn meta_description(document: &Html) -> Result<Option<String>> {
    let sel = selector(r#"meta[name="description"]"#)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty()))
}

/// Names listed under a "line-up" label.
///
/// Starts at the element holding the label text and climbs a few levels until one
/// of them has `li`/`p`/`span`-like entries whose length `accept`s.
pub fn lineup_artists<F>(document: &Html, item_css: &str, accept: F) -> Result<Vec<String>>
where
    F: Fn(usize) -> bool,
{
    let Some(label) = LINEUP_LABEL.as_ref() else {
        return Ok(Vec::new());
    };
    let items = selector(item_css)?;

    let label_node = document.root_element().descendants().find(|node| {
        node.value()
            .as_text()
            .map(|text| label.is_match(text))
            .unwrap_or(false)
    });
    let Some(label_node) = label_node else {
        return Ok(Vec::new());
    };

    let mut container = label_node.parent().and_then(ElementRef::wrap);
    for _ in 0..LINEUP_MAX_CLIMB {
        let Some(element) = container else { break };

        let artists: Vec<String> = element
            .select(&items)
            .map(|item| element_text(&item))
            .filter(|text| !text.is_empty() && !label.is_match(text))
            .filter(|text| accept(text.chars().count()))
            .take(MAX_ARTISTS)
            .collect();
        if !artists.is_empty() {
            return Ok(artists);
        }

        container = element.parent().and_then(ElementRef::wrap);
    }

    Ok(Vec::new())
}

/// When the date carries no time-of-day, take the start of a listed time range.
///
/// `date_fragment` is blanked out first so its digits are not read as a range.
pub fn with_listed_start_time(
    date: NaiveDateTime,
    text: &str,
    date_fragment: Option<&str>,
) -> NaiveDateTime {
    if date.hour() != 0 || date.minute() != 0 || date.second() != 0 {
        return date;
    }

    let text = match date_fragment {
        Some(fragment) if !fragment.is_empty() => text.replace(fragment, " "),
        _ => text.to_string(),
    };

    match extract_time_range(&text).and_then(|range| range.start_time()) {
        Some(start) => date.date().and_time(start),
        None => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("https://a.nl", "/event/x"), "https://a.nl/event/x");
        assert_eq!(absolute_url("https://a.nl/", "event/x"), "https://a.nl/event/x");
        assert_eq!(absolute_url("https://a.nl", "https://b.nl/y"), "https://b.nl/y");
    }

    #[test]
    fn test_lineup_climbs_past_heading() {
        let document = Html::parse_document(
            r#"<section><h3>Line-up</h3><ul><li>DJ One</li><li>DJ Two</li></ul></section>"#,
        );
        let artists = lineup_artists(&document, "li, p, span", |len| len < 50).unwrap();
        assert_eq!(artists, vec!["DJ One", "DJ Two"]);
    }

    #[test]
    fn test_lineup_without_label_is_empty() {
        let document = Html::parse_document(r#"<div class="lineup"><p>DJ Test</p></div>"#);
        let artists = lineup_artists(&document, "li, p, span", |len| len < 50).unwrap();
        assert!(artists.is_empty());
    }

    #[test]
    fn test_listed_start_time_applies_to_midnight_only() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let text = "15-03-2024 Doors 23:00 - 06:00";

        let timed = with_listed_start_time(midnight, text, Some("15-03-2024"));
        assert_eq!(timed, midnight.date().and_hms_opt(23, 0, 0).unwrap());

        let evening = midnight.date().and_hms_opt(22, 0, 0).unwrap();
        assert_eq!(with_listed_start_time(evening, text, None), evening);
    }

    #[test]
    fn test_first_capture_uses_first_matching_pattern() {
        let patterns = compile_patterns(&[r"(\d{1,2}[./]\d{1,2}[./]\d{2,4})", r"(\d{1,2}\s+\w+\s+\d{4})"]);
        let text = "Saturday 2 August 2025 or 02.08.2025";
        assert_eq!(first_capture(text, &patterns).as_deref(), Some("02.08.2025"));
    }
}
