use async_trait::async_trait;

/// Fetch side of the venue scrapers.
///
/// Implementations own retries and politeness delays; `None` means the page could
/// not be retrieved after every attempt, never a partial body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Option<String>;
}
