use crate::error::Result;
use crate::types::Event;
use std::fs;
use std::path::Path;
use tracing::info;

/// Pretty-printed JSON array; non-ASCII text is kept as UTF-8
pub fn events_to_json(events: &[Event]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}

/// Write the events to `path`, creating or truncating the file
pub fn save_events_json(events: &[Event], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, events_to_json(events)?)?;
    info!("Saved {} events to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Event {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        Event {
            artists: vec!["Artist 1".to_string()],
            ..Event::new("Test Venue", "https://test.com", "Test Event", date)
        }
    }

    #[test]
    fn test_events_to_json_shape() {
        let json = events_to_json(&[sample()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["venue"], "Test Venue");
        assert_eq!(value[0]["date"], "2024-03-15T23:00:00");
        assert_eq!(value[0]["artists"][0], "Artist 1");
        assert!(value[0]["url"].is_null());
        assert!(value[0]["price"].is_null());
    }

    #[test]
    fn test_empty_list_is_empty_array() {
        let json = events_to_json(&[]).unwrap();
        assert_eq!(json.trim(), "[]");
    }
}
