//! Date and time normalization for scraped listing text.

pub mod date_phrase;
pub mod dates;
pub mod time_range;

pub use date_phrase::parse_date_phrase;
pub use dates::{parse_localized_date, resolve_event_date};
pub use time_range::{extract_time_range, TimeRange};
