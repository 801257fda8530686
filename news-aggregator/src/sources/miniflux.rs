use crate::config::MinifluxConfig;
use crate::fetcher::Fetcher;
use crate::sources::{
    DEFAULT_CATEGORY, DESCRIPTION_CHAR_LIMIT, FEED_READER_SOURCE, NO_CONTENT, NO_DESCRIPTION, UNTITLED_ARTICLE,
};
use crate::types::{Article, ArticleSource, Result, PLACEHOLDER_IMAGE};
use crate::utils::{
    text::{non_empty, truncate_chars},
    time,
    url::is_article_url,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    #[serde(default)]
    pub total: Option<u64>,
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RawEntry {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    pub feed: RawFeed,
}

#[derive(Debug, Deserialize)]
pub struct RawFeed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub title: Option<String>,
}

/// Feed-reader provider (`GET /v1/entries` with a token header).
pub struct MinifluxSource {
    fetcher: Arc<Fetcher>,
    entries_url: String,
    auth_token: String,
}

impl MinifluxSource {
    pub fn new(fetcher: Arc<Fetcher>, config: &MinifluxConfig) -> Self {
        Self {
            fetcher,
            entries_url: config.entries_url.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn source_name(&self) -> String {
        crate::utils::url::extract_domain(&self.entries_url)
            .map(|domain| format!("Feed reader ({})", domain))
            .unwrap_or_else(|| "Feed reader".to_string())
    }

    pub async fn entries(&self) -> Result<Vec<Article>> {
        debug!("Pulling feed reader entries from {}", self.entries_url);

        let response: EntriesResponse = self
            .fetcher
            .get_json(&self.entries_url, &[], &[(AUTH_HEADER, self.auth_token.as_str())])
            .await?;

        let articles = normalize_entries(response.entries, Utc::now());
        info!(
            "Feed reader returned {} entries (total reported: {:?})",
            articles.len(),
            response.total
        );
        Ok(articles)
    }
}

pub fn normalize_entries(entries: Vec<RawEntry>, now: DateTime<Utc>) -> Vec<Article> {
    entries
        .into_iter()
        .filter_map(|entry| normalize_entry(entry, now))
        .collect()
}

pub fn normalize_entry(entry: RawEntry, now: DateTime<Utc>) -> Option<Article> {
    let url = match non_empty(entry.url.as_deref()) {
        Some(url) if is_article_url(url) => url.to_string(),
        _ => {
            warn!("Skipping feed reader entry {} without a valid url", entry.id);
            return None;
        }
    };

    let content = non_empty(entry.content.as_deref());

    Some(Article {
        url,
        title: non_empty(entry.title.as_deref()).unwrap_or(UNTITLED_ARTICLE).to_string(),
        description: content
            .map(|c| truncate_chars(c, DESCRIPTION_CHAR_LIMIT))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        content: content.unwrap_or(NO_CONTENT).to_string(),
        image_url: non_empty(entry.feed.image.as_deref()).unwrap_or(PLACEHOLDER_IMAGE).to_string(),
        source: ArticleSource {
            name: non_empty(entry.feed.title.as_deref()).unwrap_or(FEED_READER_SOURCE).to_string(),
        },
        published_at: time::parse_or(entry.published_at.as_deref(), now),
        category: non_empty(entry.feed.category.as_ref().and_then(|c| c.title.as_deref()))
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        likes: 0,
        dislikes: 0,
    })
}
