use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image shown when an article carries no usable image URL.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
}

/// A news article as cached in the `news` table.
///
/// The source URL is the identity: it is the dedup key for the store and
/// for every list the feed hands out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub source: ArticleSource,
    pub published_at: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub likes: i32,
    #[serde(default)]
    pub dislikes: i32,
}

impl Article {
    pub fn with_image_fallback(mut self) -> Self {
        if self.image_url.trim().is_empty() {
            self.image_url = PLACEHOLDER_IMAGE.to_owned();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,
    pub preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: String,
    pub question: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestPoint {
    pub category: String,
    pub value: f64,
    pub percentage: f64,
    pub previous_percentage: f64,
}

/// Body of a profile edit submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub old_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    pub preferences: Vec<String>,
}

// Object style note:
// These are plain data carriers shared between the gateway, the feed and
// the panels. Anything that talks to the network lives in news-aggregator
// and receives its clients from the entry point.
