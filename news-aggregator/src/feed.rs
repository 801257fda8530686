use crate::traits::NewsGateway;
use crate::types::{Article, FeedConfig};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub const NO_NEWS_MESSAGE: &str = "No news available for this category yet. Please wait for news to be fetched.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load news. Showing cached data if available.";

/// Owned view of the feed for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub articles: Vec<Article>,
    pub page: u32,
    pub category: String,
    pub loading: bool,
    pub populating: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A populate run was in flight; nothing changed.
    Skipped,
    Loaded { shown: usize },
    /// Reset load with nothing to show for the active category.
    Empty,
    /// Store failure; the previous articles are kept.
    Failed,
    /// The filter changed while this load was in flight; its result was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    AlreadyRunning,
    Completed { new_articles: usize, reload: LoadOutcome },
}

#[derive(Debug)]
struct FeedState {
    articles: Vec<Article>,
    page: u32,
    category: String,
    error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            page: 1,
            category: String::new(),
            error: None,
        }
    }
}

/// Article feed controller: pagination, category filter, dedup and the
/// populate/load choreography on top of a [`NewsGateway`].
///
/// Methods take `&self`; share the controller behind an `Arc` to drive it
/// from several tasks.
pub struct FeedController {
    gateway: Arc<dyn NewsGateway>,
    config: FeedConfig,
    state: RwLock<FeedState>,
    populating: AtomicBool,
    in_flight_loads: AtomicUsize,
    generation: AtomicU64,
}

/// Clears the populate flag on every exit path.
struct PopulateGuard<'a>(&'a AtomicBool);

impl Drop for PopulateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Counts one in-flight load until dropped, including when the load future is cancelled.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FeedController {
    pub fn new(gateway: Arc<dyn NewsGateway>, config: FeedConfig) -> Self {
        Self {
            gateway,
            config,
            state: RwLock::new(FeedState::default()),
            populating: AtomicBool::new(false),
            in_flight_loads: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_populating(&self) -> bool {
        self.populating.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.read().await;
        let populating = self.is_populating();
        FeedSnapshot {
            articles: state.articles.clone(),
            page: state.page,
            category: state.category.clone(),
            loading: populating || self.in_flight_loads.load(Ordering::SeqCst) > 0,
            populating,
            error: state.error.clone(),
        }
    }

    /// Pull every provider into the store concurrently, then reload page one.
    pub async fn populate(&self) -> PopulateOutcome {
        if self
            .populating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Populate already in flight, ignoring request");
            return PopulateOutcome::AlreadyRunning;
        }

        let new_articles = {
            let _guard = PopulateGuard(&self.populating);
            info!(
                "Populating store from {} searches{}",
                self.config.populate_plan.len(),
                if self.config.include_feed_reader { " and the feed reader" } else { "" }
            );

            let searches = join_all(
                self.config
                    .populate_plan
                    .iter()
                    .map(|query| self.gateway.fetch_provider_articles(&query.category, query.page)),
            );
            let reader = async {
                if self.config.include_feed_reader {
                    self.gateway.fetch_feed_reader_articles().await
                } else {
                    Vec::new()
                }
            };

            let (search_batches, reader_batch) = tokio::join!(searches, reader);
            let new_articles = search_batches.iter().map(Vec::len).sum::<usize>() + reader_batch.len();
            info!("Finished populating store: {} new articles", new_articles);
            new_articles
        };

        let reload = self.load_cached_page(true, None).await;
        PopulateOutcome::Completed { new_articles, reload }
    }

    /// Read a page of cached articles into the feed.
    ///
    /// `reset` rewinds to page one and replaces the list; otherwise the current page is
    /// merged onto the end. A category override takes precedence over the
    /// active filter for this load only.
    pub async fn load_cached_page(&self, reset: bool, category_override: Option<&str>) -> LoadOutcome {
        if self.is_populating() {
            debug!("Skipping load, population in progress");
            return LoadOutcome::Skipped;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let _in_flight = InFlightGuard::enter(&self.in_flight_loads);
        let (offset, category) = {
            let mut state = self.state.write().await;
            state.error = None;
            if reset {
                state.page = 1;
            }

            let category = category_override
                .map(str::to_string)
                .unwrap_or_else(|| state.category.clone());
            let offset = if reset {
                0
            } else {
                (state.page.max(1) as usize - 1) * self.config.page_size
            };
            (offset, category)
        };

        debug!(
            "Loading news for {} (reset: {}, offset: {})",
            if category.is_empty() { "all categories" } else { category.as_str() },
            reset,
            offset
        );

        let result = self
            .gateway
            .try_fetch_cached_articles(offset, self.config.page_size)
            .await;

        let mut state = self.state.write().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("Dropping stale load for '{}'", category);
            return LoadOutcome::Stale;
        }

        match result {
            Ok(cached) => {
                let filtered: Vec<Article> = if category.is_empty() {
                    cached
                } else {
                    cached.into_iter().filter(|a| a.category == category).collect()
                };
                let unique = deduplicate_articles(filtered);

                if reset {
                    let is_empty = unique.is_empty();
                    state.articles = unique;
                    if is_empty {
                        state.error = Some(NO_NEWS_MESSAGE.to_string());
                        return LoadOutcome::Empty;
                    }
                } else {
                    let mut merged = std::mem::take(&mut state.articles);
                    merged.extend(unique);
                    state.articles = deduplicate_articles(merged);
                }

                LoadOutcome::Loaded {
                    shown: state.articles.len(),
                }
            }
            Err(e) => {
                error!("Load news error: {}", e);
                state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Set the filter and rewind to page one without touching the providers.
    /// In-flight loads started under the previous filter are discarded.
    pub async fn select_category(&self, category: &str) {
        {
            let mut state = self.state.write().await;
            state.category = category.to_string();
            state.page = 1;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!("Category changed to '{}'", category);
    }

    /// Filter-changed event: show what the cache has for `category`, then
    /// repopulate (which reloads once the providers settle).
    pub async fn change_category(&self, category: &str) -> PopulateOutcome {
        self.select_category(category).await;
        self.load_cached_page(true, Some(category)).await;
        self.populate().await
    }

    /// Advance one page and append it.
    pub async fn load_more(&self) -> LoadOutcome {
        if self.is_populating() {
            debug!("Skipping load more, population in progress");
            return LoadOutcome::Skipped;
        }

        self.state.write().await.page += 1;
        self.load_cached_page(false, None).await
    }
}

/// Keep the first article per URL, preserving order.
pub fn deduplicate_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls = HashSet::new();
    articles
        .into_iter()
        .filter(|article| {
            if seen_urls.insert(article.url.clone()) {
                true
            } else {
                debug!("Duplicate found and removed: {}", article.title);
                false
            }
        })
        .collect()
}
