use crate::types::{Article, ArticleSource, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres, Row};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Insert-only cache of articles keyed by URL.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Which of `urls` are already stored.
    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>>;

    /// Insert articles whose URL is not stored yet, all or nothing.
    /// Returns the articles that were actually written.
    async fn insert_articles(&self, articles: &[Article]) -> Result<Vec<Article>>;

    /// A page ordered by `published_at`, newest first.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Article>>;
}

pub struct PgArticleStore {
    db: Pool<Postgres>,
}

impl PgArticleStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let db = PgPool::connect(database_url).await?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn setup_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                url TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                content TEXT NOT NULL,
                image_url TEXT NOT NULL,
                source_name TEXT NOT NULL,
                published_at TIMESTAMP WITH TIME ZONE NOT NULL,
                category TEXT NOT NULL,
                likes INTEGER NOT NULL DEFAULT 0,
                dislikes INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS news_published_at_idx ON news (published_at DESC)")
            .execute(&self.db)
            .await?;

        info!("news table ready");
        Ok(())
    }

    pub async fn article_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM news")
            .fetch_one(&self.db)
            .await?;
        Ok(row.try_get("count")?)
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>> {
        if urls.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query("SELECT url FROM news WHERE url = ANY($1)")
            .bind(urls)
            .fetch_all(&self.db)
            .await?;

        let mut existing = HashSet::with_capacity(rows.len());
        for row in rows {
            existing.insert(row.try_get::<String, _>("url")?);
        }
        Ok(existing)
    }

    async fn insert_articles(&self, articles: &[Article]) -> Result<Vec<Article>> {
        let mut inserted = Vec::new();
        let mut tx = self.db.begin().await?;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO news (url, title, description, content, image_url, source_name, published_at, category, likes, dislikes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&article.url)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.content)
            .bind(&article.image_url)
            .bind(&article.source.name)
            .bind(article.published_at)
            .bind(&article.category)
            .bind(article.likes)
            .bind(article.dislikes)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted.push(article.clone());
            }
        }

        tx.commit().await?;

        info!("Stored {} new articles out of {} total", inserted.len(), articles.len());
        Ok(inserted)
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        debug!("Fetching news page offset={} limit={}", offset, limit);

        let rows = sqlx::query(
            r#"
            SELECT url, title, description, content, image_url, source_name, published_at, category, likes, dislikes
            FROM news
            ORDER BY published_at DESC, url
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            articles.push(Article {
                url: row.try_get("url")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                content: row.try_get("content")?,
                image_url: row.try_get("image_url")?,
                source: ArticleSource {
                    name: row.try_get("source_name")?,
                },
                published_at: row.try_get::<chrono::DateTime<chrono::Utc>, _>("published_at")?,
                category: row.try_get("category")?,
                likes: row.try_get("likes")?,
                dislikes: row.try_get("dislikes")?,
            });
        }

        Ok(articles)
    }
}

/// Process-local store, used for offline runs and tests.
#[derive(Default)]
pub struct MemoryArticleStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>> {
        let articles = self.articles.read().await;
        Ok(articles
            .iter()
            .filter(|article| urls.contains(&article.url))
            .map(|article| article.url.clone())
            .collect())
    }

    async fn insert_articles(&self, articles: &[Article]) -> Result<Vec<Article>> {
        let mut stored = self.articles.write().await;
        let mut inserted = Vec::new();

        for article in articles {
            if stored.iter().any(|existing| existing.url == article.url) {
                continue;
            }
            stored.push(article.clone());
            inserted.push(article.clone());
        }

        Ok(inserted)
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        let mut page = self.articles.read().await.clone();
        page.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.url.cmp(&b.url))
        });
        Ok(page.into_iter().skip(offset).take(limit).collect())
    }
}
