use crate::constants::{DEFAULT_USER_AGENT, DEFAULT_WINDOW_DAYS};
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub request_delay_secs: u64,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_secs: 2,
            request_delay_secs: 2,
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Back-off before the next attempt grows linearly with the attempt number (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.retry_delay_secs * u64::from(attempt))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub days: i64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

/// SMTP settings for the email output. Credentials never live in config.toml.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = read("SMTP_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string());
        let port = match read("SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ScraperError::Config(format!("SMTP_PORT is not a valid port: {raw}"))
            })?,
            None => 587,
        };
        let (username, password) = match (read("SMTP_USERNAME"), read("SMTP_PASSWORD")) {
            (Some(u), Some(p)) => (u, p),
            _ => {
                return Err(ScraperError::Config(
                    "SMTP_USERNAME and SMTP_PASSWORD must be set to send email".into(),
                ))
            }
        };
        let from_email = read("SMTP_FROM_EMAIL").unwrap_or_else(|| username.clone());

        Ok(Self {
            server,
            port,
            username,
            password,
            from_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let config = Config::load_from("/definitely/not/here/config.toml").unwrap();
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.aggregator.days, 7);
    }

    #[test]
    fn test_partial_config_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nmax_retries = 5\n\n[aggregator]\ndays = 14").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.fetch.retry_delay_secs, 2);
        assert_eq!(config.aggregator.days, 14);
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch\nmax_retries = ").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(ScraperError::Toml(_))
        ));
    }

    #[test]
    fn test_retry_delay_is_linear() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.retry_delay(1), Duration::from_secs(2));
        assert_eq!(fetch.retry_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_smtp_config_from_lookup() {
        let config = SmtpConfig::from_lookup(lookup_from(&[
            ("SMTP_SERVER", "smtp.env.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USERNAME", "env@test.com"),
            ("SMTP_PASSWORD", "envpass"),
        ]))
        .unwrap();

        assert_eq!(config.server, "smtp.env.com");
        assert_eq!(config.port, 465);
        assert_eq!(config.from_email, "env@test.com");
    }

    #[test]
    fn test_smtp_config_requires_credentials() {
        let result = SmtpConfig::from_lookup(lookup_from(&[("SMTP_SERVER", "smtp.env.com")]));
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_smtp_config_rejects_bad_port() {
        let result = SmtpConfig::from_lookup(lookup_from(&[
            ("SMTP_PORT", "not-a-port"),
            ("SMTP_USERNAME", "u"),
            ("SMTP_PASSWORD", "p"),
        ]));
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }
}
