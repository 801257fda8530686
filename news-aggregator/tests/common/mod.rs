#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use news_aggregator::config::{MinifluxConfig, NewsApiConfig};
use news_aggregator::sources::{MinifluxSource, NewsApiSource};
use news_aggregator::{
    AggregatorError, Article, ArticleSource, ArticleStore, ContentGateway, FetchConfig, Fetcher, NewsGateway,
    Result,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Semaphore;

static INIT: Once = Once::new();

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_API_KEY: &str = "test-key";

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 21, 12, 0, 0).unwrap()
}

/// Article published `minutes_ago` minutes before [`base_time`].
pub fn article(url: &str, category: &str, minutes_ago: i64) -> Article {
    Article {
        url: url.to_string(),
        title: format!("Title for {}", url),
        description: "Description".to_string(),
        content: "Content".to_string(),
        image_url: "https://img.example.com/a.png".to_string(),
        source: ArticleSource {
            name: "Example".to_string(),
        },
        published_at: base_time() - Duration::minutes(minutes_ago),
        category: category.to_string(),
        likes: 0,
        dislikes: 0,
    }
}

pub fn urls(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.url.as_str()).collect()
}

pub fn assert_unique_urls(articles: &[Article]) {
    let mut seen = HashSet::new();
    for article in articles {
        assert!(seen.insert(article.url.clone()), "duplicate url {}", article.url);
    }
}

pub fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "News-Aggregator-Test/1.0".to_string(),
        timeout_seconds: 5,
        max_retries: 1,
        retry_delay_ms: 10,
        ..FetchConfig::default()
    }
}

pub fn gateway_for(server_uri: &str, store: Arc<dyn ArticleStore>) -> ContentGateway {
    let fetcher = Arc::new(Fetcher::new(test_fetch_config()).expect("client builds"));
    let search = NewsApiSource::new(
        fetcher.clone(),
        &NewsApiConfig {
            search_url: format!("{}/v2/everything", server_uri),
            api_key: TEST_API_KEY.to_string(),
        },
    );
    let reader = MinifluxSource::new(
        fetcher,
        &MinifluxConfig {
            entries_url: format!("{}/v1/entries", server_uri),
            auth_token: TEST_TOKEN.to_string(),
        },
    );
    ContentGateway::new(store, search, reader)
}

/// Store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl ArticleStore for FailingStore {
    async fn existing_urls(&self, _urls: &[String]) -> Result<HashSet<String>> {
        Err(AggregatorError::General("store offline".to_string()))
    }

    async fn insert_articles(&self, _articles: &[Article]) -> Result<Vec<Article>> {
        Err(AggregatorError::General("store offline".to_string()))
    }

    async fn fetch_page(&self, _offset: usize, _limit: usize) -> Result<Vec<Article>> {
        Err(AggregatorError::General("store offline".to_string()))
    }
}

/// A closed gate: callers park in `pass` until `open` is called.
pub struct Gate(Semaphore);

impl Gate {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self(Semaphore::new(0)))
    }

    pub fn open(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        // Each waiter hands its permit back so the next one gets through.
        let _permit = self.0.acquire().await.expect("gate semaphore closed");
    }
}

/// Gateway with a scripted cache and provider side.
#[derive(Default)]
pub struct ScriptedGateway {
    cached: Mutex<Vec<Article>>,
    fail_cache: AtomicBool,
    provider_gate: Mutex<Option<Arc<Gate>>>,
    cache_gate: Mutex<Option<Arc<Gate>>>,
    pub provider_calls: AtomicUsize,
    pub reader_calls: AtomicUsize,
    pub cache_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn with_cached(articles: Vec<Article>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.cached.lock().unwrap() = articles;
        Arc::new(gateway)
    }

    pub fn set_cached(&self, articles: Vec<Article>) {
        *self.cached.lock().unwrap() = articles;
    }

    pub fn set_fail_cache(&self, fail: bool) {
        self.fail_cache.store(fail, Ordering::SeqCst);
    }

    pub fn hold_providers(&self) -> Arc<Gate> {
        let gate = Gate::closed();
        *self.provider_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn hold_cache(&self) -> Arc<Gate> {
        let gate = Gate::closed();
        *self.cache_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn release_cache_hold(&self) {
        *self.cache_gate.lock().unwrap() = None;
    }
}

#[async_trait]
impl NewsGateway for ScriptedGateway {
    async fn fetch_provider_articles(&self, _query: &str, _page: u32) -> Vec<Article> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.provider_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Vec::new()
    }

    async fn fetch_feed_reader_articles(&self) -> Vec<Article> {
        self.reader_calls.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }

    async fn try_fetch_cached_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        self.cache_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.cache_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        if self.fail_cache.load(Ordering::SeqCst) {
            return Err(AggregatorError::General("store offline".to_string()));
        }

        let mut page = self.cached.lock().unwrap().clone();
        page.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(page.into_iter().skip(offset).take(limit).collect())
    }
}

/// Spin until `condition` holds, yielding to other tasks in between.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("condition not reached in time");
}
