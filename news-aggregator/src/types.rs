// Use the interfaces crate for core types
pub use interfaces::defs::{Article, ArticleSource, InterestPoint, ProfileUpdate, SurveyQuestion, User, PLACEHOLDER_IMAGE};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_response_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            max_response_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

/// One keyword-search request issued during a populate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateQuery {
    pub category: String,
    pub page: u32,
}

impl PopulateQuery {
    pub fn new(category: impl Into<String>, page: u32) -> Self {
        Self { category: category.into(), page }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub page_size: usize,
    pub populate_plan: Vec<PopulateQuery>,
    pub include_feed_reader: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let populate_plan = ["technology", "sports", "health"]
            .iter()
            .flat_map(|category| (1..=2).map(move |page| PopulateQuery::new(*category, page)))
            .collect();

        Self {
            page_size: 20,
            populate_plan,
            include_feed_reader: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Response size exceeds limit: {size_mb}MB")]
    ResponseTooLarge { size_mb: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
