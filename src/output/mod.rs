//! Delivery of the aggregated feed: a JSON file and/or an email digest.

pub mod email;
pub mod json;

pub use email::{format_events_html, format_events_text, send_email};
pub use json::{events_to_json, save_events_json};
