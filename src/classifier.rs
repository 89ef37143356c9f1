use crate::types::Event;

/// Substrings that mark an event as techno-related
pub const TECHNO_KEYWORDS: &[&str] = &[
    "techno",
    "tech-house",
    "minimal",
    "electronic",
    "acid",
    "industrial",
    "rave",
    "warehouse",
    "underground",
    "dub techno",
    "hard techno",
    "ambient techno",
    "detroit techno",
];

fn contains_keyword(haystack: &str) -> bool {
    TECHNO_KEYWORDS.iter().any(|keyword| haystack.contains(keyword))
}

/// Case-insensitive substring match of the keyword set against the event's
/// name + description, and separately against its artist names.
pub fn is_techno_related(name: &str, description: Option<&str>, artists: &[String]) -> bool {
    let text = format!("{} {}", name, description.unwrap_or("")).to_lowercase();
    if contains_keyword(&text) {
        return true;
    }

    contains_keyword(&artists.join(" ").to_lowercase())
}

/// Keep only techno-related events, preserving order
pub fn filter_techno_events(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| {
            is_techno_related(&event.name, event.description.as_deref(), &event.artists)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(name: &str, description: Option<&str>, artists: &[&str]) -> Event {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        Event {
            description: description.map(str::to_string),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            ..Event::new("Test", "https://test.com", name, date)
        }
    }

    #[test]
    fn test_filter_by_name() {
        let events = vec![
            event("Techno Night", None, &[]),
            event("Jazz Evening", None, &[]),
            event("Underground Rave", None, &[]),
        ];

        let filtered = filter_techno_events(events);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name, "Techno Night");
        assert_eq!(filtered[1].name, "Underground Rave");
    }

    #[test]
    fn test_filter_by_description() {
        let events = vec![
            event("Friday Night", Some("Warehouse party until late"), &[]),
            event("Open Mic", Some("Acoustic singer songwriters"), &[]),
            event("Sunday Vibes", Some("Minimal and deep grooves"), &[]),
        ];

        let filtered = filter_techno_events(events);
        let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Friday Night", "Sunday Vibes"]);
    }

    #[test]
    fn test_filter_by_artists() {
        let events = vec![
            event("Music Night", None, &["Detroit Techno Militia"]),
            event("Club Night", None, &["Acid Pauli"]),
            event("Folk Session", None, &["The Fiddlers"]),
        ];

        let filtered = filter_techno_events(events);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].name, "Club Night");
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        assert!(is_techno_related("HARD TECHNO ALL NIGHTER", None, &[]));
        // Plain substring: no tokenization
        assert!(is_techno_related("Bravery Awards", None, &[]));
        assert!(!is_techno_related("Jazz Brunch", Some("Live trio"), &[]));
    }

    #[test]
    fn test_name_and_description_are_space_joined() {
        // "tech" + "-house" never forms a keyword across the join
        assert!(!is_techno_related("Tech", Some("-house"), &[]));
    }
}
