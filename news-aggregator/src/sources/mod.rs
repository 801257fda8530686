pub mod miniflux;
pub mod news_api;

pub use miniflux::{normalize_entries, normalize_entry, MinifluxSource};
pub use news_api::{normalize_search_article, normalize_search_results, NewsApiSource, RawSearchArticle};

// Fallbacks applied when a provider leaves a field out.
pub const UNTITLED_ARTICLE: &str = "Untitled Article";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_CONTENT: &str = "No content available.";
pub const UNKNOWN_SOURCE: &str = "Unknown Source";
pub const FEED_READER_SOURCE: &str = "Miniflux Feed";
pub const DEFAULT_CATEGORY: &str = "general";

/// Feed-reader entries carry no summary, so the description is cut from the content.
pub const DESCRIPTION_CHAR_LIMIT: usize = 200;
