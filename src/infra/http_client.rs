use crate::app::ports::PageFetcher;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::observability::metrics;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// `PageFetcher` over reqwest with linear back-off between attempts and a
/// politeness delay after every successful request.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchConfig,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client, settings })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let max_retries = self.settings.max_retries.max(1);

        for attempt in 1..=max_retries {
            info!("Fetching {} (attempt {}/{})", url, attempt, max_retries);
            metrics::fetch::attempt();

            match self.get_text(url).await {
                Ok(body) => {
                    debug!("Fetched {} bytes from {}", body.len(), url);
                    tokio::time::sleep(self.settings.request_delay()).await;
                    return Some(body);
                }
                Err(e) => {
                    error!("Error fetching {}: {}", url, e);
                    metrics::fetch::failure();
                    if attempt < max_retries {
                        tokio::time::sleep(self.settings.retry_delay(attempt)).await;
                    }
                }
            }
        }

        warn!("Giving up on {} after {} attempts", url, max_retries);
        metrics::fetch::exhausted();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings(max_retries: u32) -> FetchConfig {
        FetchConfig {
            max_retries,
            retry_delay_secs: 0,
            request_delay_secs: 0,
            timeout_seconds: 1,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(ReqwestFetcher::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_none() {
        let fetcher = ReqwestFetcher::new(quick_settings(2)).unwrap();
        // Port 9 on localhost refuses connections on any sane test machine
        let page = fetcher.fetch_page("http://127.0.0.1:9/").await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_returns_none() {
        let fetcher = ReqwestFetcher::new(quick_settings(1)).unwrap();
        assert!(fetcher.fetch_page("not a url").await.is_none());
    }
}
