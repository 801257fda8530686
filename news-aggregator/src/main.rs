use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use news_aggregator::auth::IdentityClient;
use news_aggregator::profile_api::{ProfileApi, ProfileBackend};
use news_aggregator::sources::{MinifluxSource, NewsApiSource};
use news_aggregator::{
    AppConfig, ArticleStore, ContentGateway, FeedController, Fetcher, MemoryArticleStore, PgArticleStore,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-aggregator", about = "Fetch, cache and page through news articles")]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Keep articles in process memory instead of Postgres
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the news table
    Schema,
    /// Pull every provider into the store, then show the first page
    Populate,
    /// Show cached articles for a category ("" for all)
    Load {
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Sign in against the identity service
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the reader's interest trend
    Interests,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if cli.database_url.is_some() {
        config.database_url = cli.database_url.clone();
    }

    let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);

    match cli.command {
        Command::Schema => setup_schema(&config, cli.memory).await,
        Command::Populate => {
            let feed = build_feed(&config, fetcher, cli.memory).await?;
            let outcome = feed.populate().await;
            info!("Populate finished: {:?}", outcome);
            print_feed(&feed).await;
            Ok(())
        }
        Command::Load { category, pages } => {
            let feed = build_feed(&config, fetcher, cli.memory).await?;
            feed.select_category(&category).await;
            feed.load_cached_page(true, None).await;
            for _ in 1..pages {
                feed.load_more().await;
            }
            print_feed(&feed).await;
            Ok(())
        }
        Command::Login { email, password } => {
            let identity = IdentityClient::new(fetcher.client().clone(), &config.identity)?;
            let session = identity.sign_in(&email, &password).await?;
            println!(
                "Signed in as {} (token expires in {}s)",
                email.trim(),
                session.expires_in.unwrap_or_default()
            );
            Ok(())
        }
        Command::Interests => {
            let profile_api = ProfileApi::new(fetcher.client().clone(), &config.profile_api_url)?;
            for point in profile_api.interest_data().await? {
                println!(
                    "{:<16} {:>6.1}%  (was {:.1}%)",
                    point.category, point.percentage, point.previous_percentage
                );
            }
            Ok(())
        }
    }
}

async fn build_feed(config: &AppConfig, fetcher: Arc<Fetcher>, memory: bool) -> anyhow::Result<FeedController> {
    let store: Arc<dyn ArticleStore> = if memory {
        info!("Using in-memory article store");
        Arc::new(MemoryArticleStore::new())
    } else {
        Arc::new(connect(config).await?)
    };

    let gateway = Arc::new(ContentGateway::new(
        store,
        NewsApiSource::new(fetcher.clone(), &config.news_api),
        MinifluxSource::new(fetcher, &config.miniflux),
    ));
    Ok(FeedController::new(gateway, config.feed.clone()))
}

async fn print_feed(feed: &FeedController) {
    let snapshot = feed.snapshot().await;
    if let Some(message) = &snapshot.error {
        println!("{}", message);
    }
    for article in &snapshot.articles {
        println!(
            "[{}] {} ({}, {})\n    {}",
            article.category,
            article.title,
            article.source.name,
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.url
        );
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgArticleStore> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL is not set (or pass --memory)"))?;
    info!(
        "Connecting to database: {}",
        config.redacted_database_url().unwrap_or_default()
    );
    PgArticleStore::new(database_url).await.map_err(|e| {
        error!("Failed to connect to database. Make sure PostgreSQL is running.");
        anyhow::Error::from(e)
    })
}

async fn setup_schema(config: &AppConfig, memory: bool) -> anyhow::Result<()> {
    if memory {
        info!("Nothing to set up for the in-memory store");
        return Ok(());
    }
    let store = connect(config).await?;
    store.setup_schema().await?;
    info!("Schema ready, {} cached articles", store.article_count().await?);
    Ok(())
}
