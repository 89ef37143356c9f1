//! Locale-agnostic date phrase parser.
//!
//! Finds the longest recognisable date inside free text ("Sat 15 March 2024, doors
//! 23:00", "March 15, 2024", "15.03.2024") and ignores the words around it. The
//! grammar is a small table of patterns over an English month keyword table;
//! other languages are handled by translating their month names to English first
//! (see [`crate::parser::dates`]).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// English month keywords, full names and abbreviations
const MONTH_KEYWORDS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("sept", 9),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// 2024-03-15
    Iso,
    /// 15/03/2024, 15.03.2024, 15-03-24
    Numeric,
    /// 15 March 2024, 15th of Mar
    DayMonth,
    /// March 15, 2024, Mar 15th
    MonthDay,
}

struct DatePattern {
    kind: PatternKind,
    regex: Regex,
}

fn month_alternation() -> String {
    let mut names: Vec<&str> = MONTH_KEYWORDS.iter().map(|(name, _)| *name).collect();
    // Longest first so "sept" is preferred over "sep"
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    names.join("|")
}

static DATE_PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    let months = month_alternation();
    let table = [
        (PatternKind::Iso, r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b".to_string()),
        (
            PatternKind::Numeric,
            r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})\b".to_string(),
        ),
        (
            PatternKind::DayMonth,
            format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({months})\b\.?(?:,?\s+(\d{{4}})\b)?"),
        ),
        (
            PatternKind::MonthDay,
            format!(r"(?i)\b({months})\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"),
        ),
    ];

    table
        .into_iter()
        .filter_map(|(kind, pattern)| match Regex::new(&pattern) {
            Ok(regex) => Some(DatePattern { kind, regex }),
            Err(e) => {
                tracing::error!("Invalid date pattern {:?}: {}", kind, e);
                None
            }
        })
        .collect()
});

static TIME_OF_DAY: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?P<h1>\d{1,2}):(?P<m1>\d{2})(?:\s*(?P<p1>[ap])\.?m\b\.?)?|(?P<h2>\d{1,2})\s*(?P<p2>[ap])\.?m\b\.?)",
    )
    .ok()
});

/// Look up an English month keyword (case-insensitive)
pub fn month_number(token: &str) -> Option<u32> {
    let token = token.trim_end_matches('.').to_lowercase();
    MONTH_KEYWORDS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

/// Parse the longest date phrase found in `text`.
///
/// A missing year is taken from `default_year` and a missing time-of-day is
/// midnight. Returns `None` when nothing in the text forms a real calendar date.
pub fn parse_date_phrase(text: &str, default_year: i32) -> Option<NaiveDateTime> {
    let (start, end, date) = longest_date_match(text, default_year)?;

    // Blank out the date so its digits are not read as a time
    let mut remainder = text.to_string();
    remainder.replace_range(start..end, &" ".repeat(end - start));

    match find_time_of_day(&remainder) {
        Some(time) => Some(date.and_time(time)),
        None => date.and_hms_opt(0, 0, 0),
    }
}

fn longest_date_match(text: &str, default_year: i32) -> Option<(usize, usize, NaiveDate)> {
    let mut best: Option<(usize, usize, NaiveDate)> = None;

    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(date) = date_from_captures(pattern.kind, &caps, default_year) else {
                continue;
            };

            let len = whole.end() - whole.start();
            let better = match best {
                None => true,
                Some((s, e, _)) => len > e - s || (len == e - s && whole.start() < s),
            };
            if better {
                best = Some((whole.start(), whole.end(), date));
            }
        }
    }

    best
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

fn date_from_captures(kind: PatternKind, caps: &Captures<'_>, default_year: i32) -> Option<NaiveDate> {
    match kind {
        PatternKind::Iso => {
            NaiveDate::from_ymd_opt(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)
        }
        PatternKind::Numeric => {
            let first: u32 = number(caps, 1)?;
            let second: u32 = number(caps, 2)?;
            let year = expand_year(caps.get(3)?.as_str())?;
            // Day-first, unless only the month-first reading is a real date
            NaiveDate::from_ymd_opt(year, second, first)
                .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
        }
        PatternKind::DayMonth => {
            let day: u32 = number(caps, 1)?;
            let month = month_number(caps.get(2)?.as_str())?;
            let year = caps
                .get(3)
                .and_then(|y| y.as_str().parse().ok())
                .unwrap_or(default_year);
            NaiveDate::from_ymd_opt(year, month, day)
        }
        PatternKind::MonthDay => {
            let month = month_number(caps.get(1)?.as_str())?;
            let day: u32 = number(caps, 2)?;
            let year = caps
                .get(3)
                .and_then(|y| y.as_str().parse().ok())
                .unwrap_or(default_year);
            NaiveDate::from_ymd_opt(year, month, day)
        }
    }
}

fn find_time_of_day(text: &str) -> Option<NaiveTime> {
    let regex = TIME_OF_DAY.as_ref()?;

    regex.captures_iter(text).find_map(|caps| {
        let (hour, minute, period) = if caps.name("h1").is_some() {
            let hour: u32 = caps.name("h1")?.as_str().parse().ok()?;
            let minute: u32 = caps.name("m1")?.as_str().parse().ok()?;
            (hour, minute, caps.name("p1").map(|p| p.as_str().to_lowercase()))
        } else {
            let hour: u32 = caps.name("h2")?.as_str().parse().ok()?;
            (hour, 0, caps.name("p2").map(|p| p.as_str().to_lowercase()))
        };

        let hour = match period.as_deref() {
            Some(_) if hour == 0 || hour > 12 => return None,
            Some("p") if hour != 12 => hour + 12,
            Some("a") if hour == 12 => 0,
            _ => hour,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}
