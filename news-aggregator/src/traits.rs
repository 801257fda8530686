use crate::types::{Article, Result};
use async_trait::async_trait;
use tracing::error;

/// Everything the feed needs from the outside world.
///
/// Provider pulls never fail from the caller's point of view: errors are
/// logged and come back as an empty batch.
#[async_trait]
pub trait NewsGateway: Send + Sync {
    /// Keyword search for `query`, storing unseen articles.
    /// Returns only the articles that were newly stored.
    async fn fetch_provider_articles(&self, query: &str, page: u32) -> Vec<Article>;

    /// Feed-reader pull, storing unseen articles.
    /// Returns only the articles that were newly stored.
    async fn fetch_feed_reader_articles(&self) -> Vec<Article>;

    /// A page of cached articles, newest first, with the store error surfaced.
    async fn try_fetch_cached_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>>;

    async fn fetch_cached_articles(&self, offset: usize, limit: usize) -> Vec<Article> {
        match self.try_fetch_cached_articles(offset, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Store query failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Server-side fetch of an article's full body for inline display.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl ContentExtractor for crate::fetcher::Fetcher {
    async fn extract(&self, url: &str) -> Result<String> {
        self.fetch_full_content(url).await
    }
}
