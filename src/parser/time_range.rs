use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// Opening hours pulled from event text, both ends as zero-padded `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: start.format("%H:%M").to_string(),
            end: end.format("%H:%M").to_string(),
        }
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.start, "%H:%M").ok()
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.end, "%H:%M").ok()
    }
}

// 23:00 - 06:00, 2300-0600 hours, 23:00 uur – 06:00 uur
static RANGE_24H: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}):?(\d{2})?\s*(?:hours?|hrs?|uur|h)?\s*[-–—]\s*(\d{1,2}):?(\d{2})?\s*(?:hours?|hrs?|uur|h)?",
    )
    .ok()
});

// 11pm - 6am
static RANGE_12H: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s*([ap]m)\s*[-–—]\s*(\d{1,2})\s*([ap]m)").ok()
});

/// Find the first start–end time pair in `text`.
///
/// The 24-hour form is tried over the whole text before the AM/PM form. Pairs
/// that are not real clock times are skipped. `None` is the common case.
pub fn extract_time_range(text: &str) -> Option<TimeRange> {
    if let Some(regex) = RANGE_24H.as_ref() {
        if let Some(range) = regex.captures_iter(text).find_map(|caps| range_24h(&caps)) {
            return Some(range);
        }
    }

    RANGE_12H
        .as_ref()?
        .captures_iter(text)
        .find_map(|caps| range_12h(&caps))
}

fn clock(caps: &Captures<'_>, hour_group: usize, minute_group: usize) -> Option<NaiveTime> {
    let hour: u32 = caps.get(hour_group)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(minute_group) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn range_24h(caps: &Captures<'_>) -> Option<TimeRange> {
    Some(TimeRange::new(clock(caps, 1, 2)?, clock(caps, 3, 4)?))
}

fn to_24_hour(hour: u32, period: &str) -> Option<u32> {
    if hour == 0 || hour > 12 {
        return None;
    }
    let is_pm = period.eq_ignore_ascii_case("pm");
    Some(match (is_pm, hour) {
        (false, 12) => 0,
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, h) => h,
    })
}

fn range_12h(caps: &Captures<'_>) -> Option<TimeRange> {
    let start_hour = to_24_hour(caps.get(1)?.as_str().parse().ok()?, caps.get(2)?.as_str())?;
    let end_hour = to_24_hour(caps.get(3)?.as_str().parse().ok()?, caps.get(4)?.as_str())?;

    Some(TimeRange::new(
        NaiveTime::from_hms_opt(start_hour, 0, 0)?,
        NaiveTime::from_hms_opt(end_hour, 0, 0)?,
    ))
}
