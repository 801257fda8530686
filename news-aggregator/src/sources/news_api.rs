use crate::config::NewsApiConfig;
use crate::fetcher::Fetcher;
use crate::sources::{NO_CONTENT, NO_DESCRIPTION, UNKNOWN_SOURCE, UNTITLED_ARTICLE};
use crate::types::{AggregatorError, Article, ArticleSource, Result, PLACEHOLDER_IMAGE};
use crate::utils::{text::non_empty, time, url::is_article_url};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Option<Vec<RawSearchArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchArticle {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: Option<RawSearchSource>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSearchSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Keyword-search news provider (`/v2/everything?q=..&page=..&apiKey=..`).
pub struct NewsApiSource {
    fetcher: Arc<Fetcher>,
    search_url: String,
    api_key: String,
}

impl NewsApiSource {
    pub fn new(fetcher: Arc<Fetcher>, config: &NewsApiConfig) -> Self {
        Self {
            fetcher,
            search_url: config.search_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn source_name(&self) -> String {
        crate::utils::url::extract_domain(&self.search_url)
            .map(|domain| format!("Keyword search ({})", domain))
            .unwrap_or_else(|| "Keyword search".to_string())
    }

    /// One page of results for `query`, normalized. `query` doubles as the category label.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<Article>> {
        debug!("Searching provider for '{}' page {}", query, page);

        let response: SearchResponse = self
            .fetcher
            .get_json(
                &self.search_url,
                &[
                    ("q", query.to_string()),
                    ("page", page.to_string()),
                    ("apiKey", self.api_key.clone()),
                ],
                &[],
            )
            .await?;

        if response.status != "ok" {
            return Err(AggregatorError::Provider(
                response.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let raw_articles = response
            .articles
            .ok_or_else(|| AggregatorError::Provider("response carries no articles array".to_string()))?;

        let articles = normalize_search_results(raw_articles, query, Utc::now());
        info!("Provider returned {} articles for '{}' page {}", articles.len(), query, page);
        Ok(articles)
    }
}

pub fn normalize_search_results(raw: Vec<RawSearchArticle>, query: &str, now: DateTime<Utc>) -> Vec<Article> {
    raw.into_iter()
        .filter_map(|article| normalize_search_article(article, query, now))
        .collect()
}

/// Map one raw result onto the common article shape. Results without a usable URL are dropped.
pub fn normalize_search_article(raw: RawSearchArticle, query: &str, now: DateTime<Utc>) -> Option<Article> {
    let url = match non_empty(raw.url.as_deref()) {
        Some(url) if is_article_url(url) => url.to_string(),
        other => {
            warn!("Skipping search result without a valid url: {:?}", other);
            return None;
        }
    };

    let description = non_empty(raw.description.as_deref());

    Some(Article {
        url,
        title: non_empty(raw.title.as_deref()).unwrap_or(UNTITLED_ARTICLE).to_string(),
        description: description.unwrap_or(NO_DESCRIPTION).to_string(),
        content: description.unwrap_or(NO_CONTENT).to_string(),
        image_url: non_empty(raw.url_to_image.as_deref()).unwrap_or(PLACEHOLDER_IMAGE).to_string(),
        source: ArticleSource {
            name: non_empty(raw.source.as_ref().and_then(|s| s.name.as_deref()))
                .unwrap_or(UNKNOWN_SOURCE)
                .to_string(),
        },
        published_at: time::parse_or(raw.published_at.as_deref(), now),
        category: query.to_string(),
        likes: 0,
        dislikes: 0,
    })
}
