use crate::config::SmtpConfig;
use crate::error::Result;
use crate::types::Event;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

const HEADING: &str = "Amsterdam Techno Events This Week";
const DATE_FORMAT: &str = "%A, %B %-d at %H:%M";
const NO_EVENTS: &str = "No techno events found for this week.";
/// Artists shown per event before collapsing the rest into "+N more"
const ARTISTS_SHOWN: usize = 5;

/// Port on which the SMTP relay expects TLS from the first byte
const IMPLICIT_TLS_PORT: u16 = 465;

fn sorted_by_date(events: &[Event]) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|event| event.date);
    sorted
}

fn artist_summary(artists: &[String]) -> Option<String> {
    if artists.is_empty() {
        return None;
    }
    let mut summary = artists
        .iter()
        .take(ARTISTS_SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if artists.len() > ARTISTS_SHOWN {
        summary.push_str(&format!(" +{} more", artists.len() - ARTISTS_SHOWN));
    }
    Some(summary)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn format_events_html(events: &[Event]) -> String {
    let mut html = String::from(
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
         body { font-family: Arial, sans-serif; background: #111; color: #eee; }\n\
         .event { border-left: 3px solid #ff2d55; margin: 16px 0; padding: 8px 12px; }\n\
         .date { color: #ff2d55; font-weight: bold; }\n\
         .venue { color: #aaa; text-transform: uppercase; font-size: 12px; }\n\
         a { color: #5ac8fa; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h1>{HEADING}</h1>\n"));

    if events.is_empty() {
        html.push_str(&format!("<p>{NO_EVENTS}</p>\n"));
    }

    for event in sorted_by_date(events) {
        html.push_str("<div class=\"event\">\n");
        html.push_str(&format!("<div class=\"date\">{}</div>\n", event.date.format(DATE_FORMAT)));
        html.push_str(&format!("<div class=\"venue\">{}</div>\n", escape_html(&event.venue)));
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&event.name)));
        if let Some(artists) = artist_summary(&event.artists) {
            html.push_str(&format!("<p><strong>Artists:</strong> {}</p>\n", escape_html(&artists)));
        }
        if let Some(price) = &event.price {
            html.push_str(&format!("<p><strong>Price:</strong> {}</p>\n", escape_html(price)));
        }
        if let Some(description) = &event.description {
            html.push_str(&format!("<p>{}</p>\n", escape_html(description)));
        }
        if let Some(url) = &event.url {
            html.push_str(&format!("<p><a href=\"{}\">More info</a></p>\n", escape_html(url)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn format_events_text(events: &[Event]) -> String {
    let heading = HEADING.to_uppercase();
    let mut text = format!("{heading}\n{}\n\n", "=".repeat(heading.len()));

    if events.is_empty() {
        text.push_str(&format!("{NO_EVENTS}\n"));
        return text;
    }

    for event in sorted_by_date(events) {
        text.push_str(&format!("{}\n", event.date.format(DATE_FORMAT)));
        text.push_str(&format!("{} - {}\n", event.venue.to_uppercase(), event.name));
        if let Some(artists) = artist_summary(&event.artists) {
            text.push_str(&format!("Artists: {artists}\n"));
        }
        if let Some(price) = &event.price {
            text.push_str(&format!("Price: {price}\n"));
        }
        if let Some(description) = &event.description {
            text.push_str(&format!("{description}\n"));
        }
        if let Some(url) = &event.url {
            text.push_str(&format!("Link: {url}\n"));
        }
        text.push_str(&format!("{}\n", "-".repeat(40)));
    }

    text
}

pub fn subject_line(event_count: usize) -> String {
    format!("Amsterdam Techno Events - {event_count} events this week")
}

/// Build the multipart text + HTML digest without sending it
pub fn build_message(events: &[Event], from: &str, recipient: &str) -> Result<Message> {
    let from: Mailbox = from.parse()?;
    let to: Mailbox = recipient.parse()?;

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(subject_line(events.len()))
        .multipart(MultiPart::alternative_plain_html(
            format_events_text(events),
            format_events_html(events),
        ))?)
}

/// Send the digest over SMTP. Without an explicit `smtp` config the settings come
/// from the `SMTP_*` environment variables. Blocks until the relay answers.
pub fn send_email(events: &[Event], recipient: &str, smtp: Option<SmtpConfig>) -> Result<()> {
    let smtp = match smtp {
        Some(smtp) => smtp,
        None => SmtpConfig::from_env()?,
    };
    let message = build_message(events, &smtp.from_email, recipient)?;

    let builder = if smtp.port == IMPLICIT_TLS_PORT {
        SmtpTransport::relay(&smtp.server)?
    } else {
        SmtpTransport::starttls_relay(&smtp.server)?
    };
    let mailer = builder
        .port(smtp.port)
        .credentials(Credentials::new(smtp.username, smtp.password))
        .build();

    mailer.send(&message)?;
    info!("Email sent successfully to {}", recipient);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sample_events() -> Vec<Event> {
        vec![
            Event {
                url: Some("https://shelter.nl/event/1".to_string()),
                artists: vec!["DJ One".to_string(), "DJ Two".to_string()],
                ..Event::new("Shelter", "https://shelter.nl", "Techno Night", at(15, 23, 0))
            },
            Event {
                artists: vec!["Artist A".into(), "Artist B".into(), "Artist C".into()],
                ..Event::new("Radion", "https://radion.nl", "Underground Session", at(16, 22, 0))
            },
            Event::new("Shelter", "https://shelter.nl", "Late Night Rave", at(17, 23, 30)),
        ]
    }

    #[test]
    fn test_format_events_html() {
        let html = format_events_html(&sample_events());
        assert!(html.contains("<html>"));
        assert!(html.contains("Amsterdam Techno Events This Week"));
        assert!(html.contains("Underground Session"));
        assert!(html.contains("DJ One, DJ Two"));
        assert!(html.contains("Friday, March 15 at 23:00"));
        assert!(html.contains("Saturday, March 16 at 22:00"));
        assert!(html.contains(r#"href="https://shelter.nl/event/1""#));
    }

    #[test]
    fn test_format_events_text() {
        let text = format_events_text(&sample_events());
        assert!(text.contains("AMSTERDAM TECHNO EVENTS THIS WEEK"));
        assert!(text.contains("SHELTER"));
        assert!(text.contains("RADION"));
        assert!(text.contains("Friday, March 15 at 23:00"));
        assert!(text.contains("Artists: DJ One, DJ Two"));
        assert!(text.contains("Link: https://shelter.nl/event/1"));
    }

    #[test]
    fn test_text_digest_layout() {
        let event = Event {
            price: Some("€15".to_string()),
            url: Some("https://radion.nl/e/1".to_string()),
            artists: vec!["Artist A".to_string()],
            ..Event::new("Radion", "https://radion.nl", "Acid Club", at(16, 22, 0))
        };
        let expected = format!(
            "AMSTERDAM TECHNO EVENTS THIS WEEK\n{}\n\n\
             Saturday, March 16 at 22:00\n\
             RADION - Acid Club\n\
             Artists: Artist A\n\
             Price: €15\n\
             Link: https://radion.nl/e/1\n\
             {}\n",
            "=".repeat(33),
            "-".repeat(40)
        );
        assert_eq!(format_events_text(&[event]), expected);
    }

    #[test]
    fn test_html_digest_has_one_element_per_line() {
        let html = format_events_html(&[Event::new(
            "Lofi",
            "https://lofi.amsterdam",
            "Warehouse",
            at(15, 23, 0),
        )]);
        assert!(html.contains("<h1>Amsterdam Techno Events This Week</h1>\n"));
        assert!(html.contains("<div class=\"venue\">Lofi</div>\n<h2>Warehouse</h2>\n</div>\n"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_many_artists_are_collapsed() {
        let event = Event {
            artists: (0..10).map(|i| format!("Artist {i}")).collect(),
            ..Event::new("Test", "https://test.com", "Big Festival", at(15, 20, 0))
        };
        let expected = "Artist 0, Artist 1, Artist 2, Artist 3, Artist 4 +5 more";
        assert!(format_events_html(std::slice::from_ref(&event)).contains(expected));
        assert!(format_events_text(&[event]).contains(expected));
    }

    #[test]
    fn test_events_sorted_by_date() {
        let mut events = sample_events();
        events.reverse();
        let text = format_events_text(&events);

        let pos_15 = text.find("March 15").unwrap();
        let pos_16 = text.find("March 16").unwrap();
        let pos_17 = text.find("March 17").unwrap();
        assert!(pos_15 < pos_16 && pos_16 < pos_17);
    }

    #[test]
    fn test_empty_digest() {
        assert!(format_events_text(&[]).contains("No techno events found"));
        assert!(format_events_html(&[]).contains("No techno events found"));
    }

    #[test]
    fn test_html_is_escaped() {
        let event = Event::new("Test", "https://t", "Bass & <Beats>", at(15, 20, 0));
        let html = format_events_html(&[event]);
        assert!(html.contains("Bass &amp; &lt;Beats&gt;"));
    }

    #[test]
    fn test_build_message_subject() {
        let message = build_message(&sample_events(), "from@test.com", "to@test.com").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Amsterdam Techno Events - 3 events this week"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_invalid_recipient_is_an_email_error() {
        let result = build_message(&sample_events(), "from@test.com", "not an address");
        assert!(matches!(result, Err(crate::error::ScraperError::Email(_))));
    }
}
