pub mod auth;
pub mod card;
pub mod chat;
pub mod config;
pub mod feed;
pub mod fetcher;
pub mod gateway;
pub mod profile;
pub mod profile_api;
pub mod sources;
pub mod store;
pub mod traits;
pub mod types;
pub mod utils;

pub use types::*;
pub use config::AppConfig;
pub use feed::{FeedController, FeedSnapshot, LoadOutcome, PopulateOutcome};
pub use fetcher::Fetcher;
pub use gateway::ContentGateway;
pub use store::{ArticleStore, MemoryArticleStore, PgArticleStore};
pub use traits::{ContentExtractor, NewsGateway};
