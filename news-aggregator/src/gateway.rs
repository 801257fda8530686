use crate::sources::{MinifluxSource, NewsApiSource};
use crate::store::ArticleStore;
use crate::traits::NewsGateway;
use crate::types::{Article, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Remote content gateway: two providers in front of the article store.
///
/// All clients are built by the entry point and handed in here.
pub struct ContentGateway {
    store: Arc<dyn ArticleStore>,
    search: NewsApiSource,
    reader: MinifluxSource,
}

impl ContentGateway {
    pub fn new(store: Arc<dyn ArticleStore>, search: NewsApiSource, reader: MinifluxSource) -> Self {
        Self { store, search, reader }
    }

    pub fn store(&self) -> Arc<dyn ArticleStore> {
        self.store.clone()
    }

    /// Write the articles the store has not seen and return exactly those.
    async fn store_new_articles(&self, articles: Vec<Article>, origin: &str) -> Result<Vec<Article>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let urls: Vec<String> = articles.iter().map(|a| a.url.clone()).collect();
        let existing = self.store.existing_urls(&urls).await?;

        let mut batch_urls = HashSet::new();
        let fresh: Vec<Article> = articles
            .into_iter()
            .filter(|article| !existing.contains(&article.url))
            .filter(|article| batch_urls.insert(article.url.clone()))
            .collect();

        if fresh.is_empty() {
            debug!("No new articles to save from {}", origin);
            return Ok(Vec::new());
        }

        let inserted = self.store.insert_articles(&fresh).await?;
        info!("Saved {} new articles from {}", inserted.len(), origin);
        Ok(inserted)
    }
}

#[async_trait]
impl NewsGateway for ContentGateway {
    async fn fetch_provider_articles(&self, query: &str, page: u32) -> Vec<Article> {
        let articles = match self.search.search(query, page).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching news for '{}' page {}: {}", query, page, e);
                return Vec::new();
            }
        };

        match self.store_new_articles(articles, &self.search.source_name()).await {
            Ok(inserted) => inserted,
            Err(e) => {
                error!("Error saving search results for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    async fn fetch_feed_reader_articles(&self) -> Vec<Article> {
        let articles = match self.reader.entries().await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Feed reader error: {}", e);
                return Vec::new();
            }
        };

        match self.store_new_articles(articles, &self.reader.source_name()).await {
            Ok(inserted) => inserted,
            Err(e) => {
                error!("Error saving feed reader articles: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_cached_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        debug!("Fetching cached news with offset {} limit {}", offset, limit);
        let page = self.store.fetch_page(offset, limit).await?;
        Ok(page.into_iter().map(Article::with_image_fallback).collect())
    }
}

