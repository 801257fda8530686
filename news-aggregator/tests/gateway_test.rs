mod common;

use common::*;
use news_aggregator::sources::{
    normalize_entry, normalize_search_article, RawSearchArticle, DEFAULT_CATEGORY, FEED_READER_SOURCE,
    NO_CONTENT, NO_DESCRIPTION, UNKNOWN_SOURCE, UNTITLED_ARTICLE,
};
use news_aggregator::{ArticleStore, MemoryArticleStore, NewsGateway, PLACEHOLDER_IMAGE};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": { "id": null, "name": "The Verge" },
                "title": "Chips get faster",
                "description": "A new generation of chips.",
                "url": "https://example.com/chips",
                "urlToImage": "https://img.example.com/chips.png",
                "publishedAt": "2024-10-20T08:00:00Z"
            },
            {
                "source": { "id": null, "name": null },
                "title": null,
                "description": null,
                "url": "https://example.com/bare",
                "urlToImage": null,
                "publishedAt": null
            },
            {
                "source": { "name": "Broken" },
                "title": "No link",
                "url": null
            }
        ]
    })
}

async fn mount_search(server: &MockServer, query: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", query))
        .and(query_param("apiKey", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn provider_articles_are_normalized_and_stored() {
    init_tracing();

    let server = MockServer::start().await;
    mount_search(&server, "technology", search_body()).await;

    let store = Arc::new(MemoryArticleStore::new());
    let gateway = gateway_for(&server.uri(), store.clone());

    let articles = gateway.fetch_provider_articles("technology", 1).await;

    assert_eq!(urls(&articles), vec!["https://example.com/chips", "https://example.com/bare"]);
    assert_eq!(store.len().await, 2);

    let chips = &articles[0];
    assert_eq!(chips.title, "Chips get faster");
    assert_eq!(chips.content, "A new generation of chips.");
    assert_eq!(chips.source.name, "The Verge");
    assert_eq!(chips.category, "technology");
    assert_eq!(chips.published_at.to_rfc3339(), "2024-10-20T08:00:00+00:00");

    let bare = &articles[1];
    assert_eq!(bare.title, UNTITLED_ARTICLE);
    assert_eq!(bare.description, NO_DESCRIPTION);
    assert_eq!(bare.content, NO_CONTENT);
    assert_eq!(bare.source.name, UNKNOWN_SOURCE);
    assert_eq!(bare.image_url, PLACEHOLDER_IMAGE);
}

#[tokio::test]
async fn repeated_fetch_returns_only_new_articles() {
    init_tracing();

    let server = MockServer::start().await;
    mount_search(&server, "sports", search_body()).await;

    let store = Arc::new(MemoryArticleStore::with_articles(vec![article(
        "https://example.com/chips",
        "technology",
        30,
    )]));
    let gateway = gateway_for(&server.uri(), store.clone());

    let first = gateway.fetch_provider_articles("sports", 1).await;
    assert_eq!(urls(&first), vec!["https://example.com/bare"]);

    let second = gateway.fetch_provider_articles("sports", 1).await;
    assert!(second.is_empty());
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn duplicate_urls_within_one_batch_are_stored_once() {
    init_tracing();

    let server = MockServer::start().await;
    let article = json!({
        "source": { "name": "Wire" },
        "title": "Same story",
        "url": "https://example.com/same",
        "publishedAt": "2024-10-20T08:00:00Z"
    });
    mount_search(
        &server,
        "health",
        json!({ "status": "ok", "articles": [article.clone(), article] }),
    )
    .await;

    let store = Arc::new(MemoryArticleStore::new());
    let gateway = gateway_for(&server.uri(), store.clone());

    let inserted = gateway.fetch_provider_articles("health", 1).await;
    assert_eq!(inserted.len(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn provider_error_status_yields_nothing() {
    init_tracing();

    let server = MockServer::start().await;
    mount_search(
        &server,
        "technology",
        json!({ "status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid." }),
    )
    .await;

    let store = Arc::new(MemoryArticleStore::new());
    let gateway = gateway_for(&server.uri(), store.clone());

    assert!(gateway.fetch_provider_articles("technology", 1).await.is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn server_errors_are_retried_then_swallowed() {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri(), Arc::new(MemoryArticleStore::new()));

    assert!(gateway.fetch_provider_articles("technology", 1).await.is_empty());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/entries"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri(), Arc::new(MemoryArticleStore::new()));

    assert!(gateway.fetch_feed_reader_articles().await.is_empty());
}

#[tokio::test]
async fn store_failure_yields_nothing() {
    init_tracing();

    let server = MockServer::start().await;
    mount_search(&server, "technology", search_body()).await;

    let gateway = gateway_for(&server.uri(), Arc::new(FailingStore));

    assert!(gateway.fetch_provider_articles("technology", 1).await.is_empty());
    assert!(gateway.try_fetch_cached_articles(0, 20).await.is_err());
    assert!(gateway.fetch_cached_articles(0, 20).await.is_empty());
}

#[tokio::test]
async fn feed_reader_entries_are_normalized_and_stored() {
    init_tracing();

    let long_content = "x".repeat(250);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/entries"))
        .and(header("X-Auth-Token", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "entries": [
                {
                    "id": 1,
                    "title": "Long read",
                    "url": "https://blog.example.com/long",
                    "content": long_content,
                    "published_at": "2024-10-19T10:30:00+02:00",
                    "feed": {
                        "title": "Example Blog",
                        "category": { "title": "Science" }
                    }
                },
                {
                    "id": 2,
                    "title": "",
                    "url": "https://blog.example.com/short",
                    "content": null,
                    "published_at": "not a date",
                    "feed": { "title": null }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryArticleStore::new());
    let gateway = gateway_for(&server.uri(), store.clone());

    let articles = gateway.fetch_feed_reader_articles().await;
    assert_eq!(articles.len(), 2);
    assert_eq!(store.len().await, 2);

    let long = &articles[0];
    assert_eq!(long.description.chars().count(), 200);
    assert_eq!(long.content.chars().count(), 250);
    assert_eq!(long.category, "Science");
    assert_eq!(long.source.name, "Example Blog");
    assert_eq!(long.image_url, PLACEHOLDER_IMAGE);
    assert_eq!(long.published_at.to_rfc3339(), "2024-10-19T08:30:00+00:00");

    let short = &articles[1];
    assert_eq!(short.title, UNTITLED_ARTICLE);
    assert_eq!(short.description, NO_DESCRIPTION);
    assert_eq!(short.content, NO_CONTENT);
    assert_eq!(short.source.name, FEED_READER_SOURCE);
    assert_eq!(short.category, DEFAULT_CATEGORY);
}

#[tokio::test]
async fn cached_page_is_newest_first_with_image_fallback() {
    init_tracing();

    let mut no_image = article("https://example.com/old", "tech", 90);
    no_image.image_url = String::new();

    let store = Arc::new(MemoryArticleStore::with_articles(vec![
        no_image,
        article("https://example.com/new", "tech", 5),
        article("https://example.com/mid", "tech", 30),
    ]));
    let gateway = gateway_for("http://127.0.0.1:9", store);

    let first = gateway.fetch_cached_articles(0, 2).await;
    assert_eq!(urls(&first), vec!["https://example.com/new", "https://example.com/mid"]);

    let second = gateway.fetch_cached_articles(2, 2).await;
    assert_eq!(urls(&second), vec!["https://example.com/old"]);
    assert_eq!(second[0].image_url, PLACEHOLDER_IMAGE);

    assert!(gateway.fetch_cached_articles(10, 2).await.is_empty());
}

#[tokio::test]
async fn memory_store_reports_only_inserted_rows() {
    let store = MemoryArticleStore::with_articles(vec![article("https://example.com/a", "tech", 1)]);

    let inserted = store
        .insert_articles(&[
            article("https://example.com/a", "tech", 1),
            article("https://example.com/b", "tech", 2),
        ])
        .await
        .expect("insert");

    assert_eq!(urls(&inserted), vec!["https://example.com/b"]);
    let existing = store
        .existing_urls(&["https://example.com/a".to_string(), "https://example.com/z".to_string()])
        .await
        .expect("lookup");
    assert!(existing.contains("https://example.com/a"));
    assert!(!existing.contains("https://example.com/z"));
}

#[test]
fn search_results_without_http_urls_are_dropped() {
    let raw: RawSearchArticle = serde_json::from_value(json!({
        "title": "Removed",
        "url": "https://removed.com"
    }))
    .expect("raw article");
    assert!(normalize_search_article(raw, "technology", base_time()).is_some());

    let raw: RawSearchArticle = serde_json::from_value(json!({ "title": "Local", "url": "file:///etc/passwd" }))
        .expect("raw article");
    assert!(normalize_search_article(raw, "technology", base_time()).is_none());
}

#[test]
fn entry_timestamp_falls_back_to_now() {
    let entry = serde_json::from_value(json!({
        "id": 7,
        "url": "https://blog.example.com/p",
        "feed": {}
    }))
    .expect("raw entry");

    let article = normalize_entry(entry, base_time()).expect("valid entry");
    assert_eq!(article.published_at, base_time());
}
