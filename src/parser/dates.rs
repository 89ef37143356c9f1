use crate::parser::date_phrase::parse_date_phrase;
use chrono::{Datelike, Duration, Local, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Dutch month names and the Dutch-only abbreviations, with their English equivalents
const DUTCH_MONTHS: &[(&str, &str)] = &[
    ("januari", "january"),
    ("februari", "february"),
    ("maart", "march"),
    ("april", "april"),
    ("mei", "may"),
    ("juni", "june"),
    ("juli", "july"),
    ("augustus", "august"),
    ("september", "september"),
    ("oktober", "october"),
    ("november", "november"),
    ("december", "december"),
    ("mrt", "mar"),
    ("okt", "oct"),
];

const DUTCH_DAYS: &[(&str, &str)] = &[
    ("maandag", "monday"),
    ("dinsdag", "tuesday"),
    ("woensdag", "wednesday"),
    ("donderdag", "thursday"),
    ("vrijdag", "friday"),
    ("zaterdag", "saturday"),
    ("zondag", "sunday"),
];

fn word_table_regex(table: &[(&str, &str)]) -> Option<Regex> {
    let words: Vec<&str> = table.iter().map(|(dutch, _)| *dutch).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).ok()
}

static DUTCH_MONTH_WORDS: Lazy<Option<Regex>> = Lazy::new(|| word_table_regex(DUTCH_MONTHS));
static DUTCH_DAY_WORDS: Lazy<Option<Regex>> = Lazy::new(|| word_table_regex(DUTCH_DAYS));
static EXPLICIT_YEAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\b\d{4}\b").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeDay {
    Today,
    Overmorrow,
    Tomorrow,
    ThisWeekend,
}

/// Checked in this order; word boundaries keep "overmorgen" from reading as "morgen"
static RELATIVE_KEYWORDS: Lazy<Vec<(Regex, RelativeDay)>> = Lazy::new(|| {
    [
        (r"(?i)\b(?:today|vandaag)\b", RelativeDay::Today),
        (r"(?i)\b(?:overmorrow|overmorgen)\b", RelativeDay::Overmorrow),
        (r"(?i)\b(?:tomorrow|morgen)\b", RelativeDay::Tomorrow),
        (r"(?i)\b(?:this|dit)\s+weekend\b", RelativeDay::ThisWeekend),
    ]
    .into_iter()
    .filter_map(|(pattern, day)| Regex::new(pattern).ok().map(|regex| (regex, day)))
    .collect()
});

fn replace_words(text: &str, regex: &Option<Regex>, table: &[(&str, &str)]) -> String {
    let Some(regex) = regex else {
        return text.to_string();
    };
    regex
        .replace_all(text, |caps: &Captures<'_>| {
            let word = caps[0].to_lowercase();
            table
                .iter()
                .find(|(dutch, _)| *dutch == word)
                .map(|(_, english)| english.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace Dutch month and day names with their English equivalents, case-insensitively.
pub fn translate_dutch(text: &str) -> String {
    let months = replace_words(text, &DUTCH_MONTH_WORDS, DUTCH_MONTHS);
    replace_words(&months, &DUTCH_DAY_WORDS, DUTCH_DAYS)
}

/// Parse an English or Dutch date fragment; a missing year means the current year.
pub fn parse_localized_date(fragment: &str) -> Option<NaiveDateTime> {
    parse_localized_date_in_year(fragment, Local::now().year())
}

pub fn parse_localized_date_in_year(fragment: &str, default_year: i32) -> Option<NaiveDateTime> {
    let translated = translate_dutch(fragment.trim());
    parse_date_phrase(&translated, default_year)
}

/// True when the fragment spells out a four-digit year
pub fn has_explicit_year(fragment: &str) -> bool {
    EXPLICIT_YEAR
        .as_ref()
        .map(|regex| regex.is_match(fragment))
        .unwrap_or(false)
}

/// Resolve a scraped date fragment against `reference`. Never fails.
///
/// Order: structured parse, Dutch-aware parse, relative keywords, and finally
/// `reference` itself. A structured date without a year that lands before
/// `reference` is moved one year ahead, since venues list upcoming nights.
pub fn resolve_event_date(fragment: &str, reference: NaiveDateTime) -> NaiveDateTime {
    let fragment = fragment.trim();

    let parsed = parse_date_phrase(fragment, reference.year())
        .or_else(|| parse_localized_date_in_year(fragment, reference.year()));

    if let Some(parsed) = parsed {
        return roll_forward_if_past(parsed, fragment, reference);
    }

    if let Some(relative) = resolve_relative(fragment, reference) {
        return relative;
    }

    warn!("Could not parse date: {}, using reference date", fragment);
    reference
}

fn roll_forward_if_past(
    parsed: NaiveDateTime,
    fragment: &str,
    reference: NaiveDateTime,
) -> NaiveDateTime {
    if parsed >= reference || has_explicit_year(fragment) {
        return parsed;
    }

    match parsed.with_year(parsed.year() + 1) {
        Some(rolled) => {
            debug!("Rolled '{}' forward to {}", fragment, rolled);
            rolled
        }
        // 29 February with no leap day next year
        None => parsed,
    }
}

fn resolve_relative(fragment: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let (_, day) = RELATIVE_KEYWORDS
        .iter()
        .find(|(regex, _)| regex.is_match(fragment))?;

    let offset = match day {
        RelativeDay::Today => 0,
        RelativeDay::Tomorrow => 1,
        RelativeDay::Overmorrow => 2,
        RelativeDay::ThisWeekend => days_until_weekend(reference),
    };

    Some(reference + Duration::days(offset))
}

/// Days until the Friday that opens "this weekend". Said on a Friday evening it
/// already means next week's Friday.
fn days_until_weekend(reference: NaiveDateTime) -> i64 {
    let weekday = i64::from(reference.weekday().num_days_from_monday());
    let days = (4 - weekday).rem_euclid(7);
    if days == 0 && reference.hour() >= 18 {
        7
    } else {
        days
    }
}
