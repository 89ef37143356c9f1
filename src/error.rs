use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Email error: {0}")]
    Email(String),

    #[error("Scrape of {venue} failed: {message}")]
    Venue { venue: String, message: String },
}

impl From<lettre::error::Error> for ScraperError {
    fn from(e: lettre::error::Error) -> Self {
        ScraperError::Email(e.to_string())
    }
}

impl From<lettre::address::AddressError> for ScraperError {
    fn from(e: lettre::address::AddressError) -> Self {
        ScraperError::Email(format!("invalid address: {e}"))
    }
}

impl From<lettre::transport::smtp::Error> for ScraperError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        ScraperError::Email(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
