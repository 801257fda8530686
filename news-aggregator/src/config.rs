use crate::types::{AggregatorError, FeedConfig, FetchConfig, Result};
use std::env;
use url::Url;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_MINIFLUX_URL: &str = "http://localhost:8080/v1/entries";
pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:54321";
pub const DEFAULT_PROFILE_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub search_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct MinifluxConfig {
    pub entries_url: String,
    pub auth_token: String,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub anon_key: String,
}

/// Everything the entry point needs to build the clients it hands out.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub news_api: NewsApiConfig,
    pub miniflux: MinifluxConfig,
    pub identity: IdentityConfig,
    pub profile_api_url: String,
    pub fetch: FetchConfig,
    pub feed: FeedConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let get_url = |key: &str, default: &str| -> Result<String> {
            let value = get(key).unwrap_or_else(|| default.to_string());
            Url::parse(&value)
                .map_err(|e| AggregatorError::Config(format!("{} is not a valid URL ({}): {}", key, e, value)))?;
            Ok(value)
        };

        let mut fetch = FetchConfig::default();
        if let Some(timeout) = get("FETCH_TIMEOUT_SECONDS") {
            fetch.timeout_seconds = timeout
                .parse()
                .map_err(|_| AggregatorError::Config(format!("FETCH_TIMEOUT_SECONDS must be an integer, got {}", timeout)))?;
        }

        let mut feed = FeedConfig::default();
        if let Some(page_size) = get("FEED_PAGE_SIZE") {
            feed.page_size = page_size
                .parse()
                .ok()
                .filter(|size: &usize| *size > 0)
                .ok_or_else(|| AggregatorError::Config(format!("FEED_PAGE_SIZE must be a positive integer, got {}", page_size)))?;
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            news_api: NewsApiConfig {
                search_url: get_url("NEWS_API_URL", DEFAULT_NEWS_API_URL)?,
                api_key: get("NEWS_API_KEY").unwrap_or_default(),
            },
            miniflux: MinifluxConfig {
                entries_url: get_url("MINIFLUX_URL", DEFAULT_MINIFLUX_URL)?,
                auth_token: get("MINIFLUX_API_KEY").unwrap_or_default(),
            },
            identity: IdentityConfig {
                base_url: get_url("IDENTITY_URL", DEFAULT_IDENTITY_URL)?,
                anon_key: get("IDENTITY_ANON_KEY").unwrap_or_default(),
            },
            profile_api_url: get_url("PROFILE_API_URL", DEFAULT_PROFILE_API_URL)?,
            fetch,
            feed,
        })
    }

    /// Connection string with the password masked, for logs.
    pub fn redacted_database_url(&self) -> Option<String> {
        let raw = self.database_url.as_deref()?;
        match Url::parse(raw) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                Some(parsed.to_string())
            }
            Err(_) => Some("<unparseable database url>".to_string()),
        }
    }
}
