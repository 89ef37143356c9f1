//! Venue identifiers and base URLs shared by the scrapers, the CLI and the tests.

pub const SHELTER_VENUE_NAME: &str = "Shelter";
pub const SHELTER_URL: &str = "https://www.shelteramsterdam.nl";

pub const RADION_VENUE_NAME: &str = "Radion";
pub const RADION_URL: &str = "https://radion.amsterdam";

pub const LOFI_VENUE_NAME: &str = "Lofi";
pub const LOFI_URL: &str = "https://lofi.amsterdam";

/// Extraction-time cap on the artist list of a single event
pub const MAX_ARTISTS: usize = 10;

/// Name used when a page or container has no usable title
pub const UNKNOWN_EVENT_NAME: &str = "Unknown Event";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Look-ahead window used when neither the CLI nor config.toml sets one
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
/// Upper bound for `--days`
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Get all supported venue names in scrape order
pub fn get_supported_venues() -> Vec<&'static str> {
    vec![SHELTER_VENUE_NAME, RADION_VENUE_NAME, LOFI_VENUE_NAME]
}
