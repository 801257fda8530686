use crate::chat::ChatSession;
use crate::traits::ContentExtractor;
use crate::types::{Article, PLACEHOLDER_IMAGE};
use crate::utils::time::time_ago;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub const LOGIN_TO_LIKE: &str = "Please log in to like articles";
pub const LOGIN_TO_DISLIKE: &str = "Please log in to dislike articles";
pub const LOGIN_TO_CHAT: &str = "Please log in to chat about articles";
pub const CONTENT_UNAVAILABLE: &str = "Failed to load full article content.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("{prompt}")]
    LoginRequired { prompt: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    None,
    Liked,
    Disliked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanding,
    Expanded,
}

/// Display state for one article.
///
/// Like/dislike counters are client-side only: they start from the stored
/// counts and are never written back.
#[derive(Debug, Clone)]
pub struct ArticleCard {
    article: Article,
    logged_in: bool,
    likes: i32,
    dislikes: i32,
    interaction: Interaction,
    expansion: Expansion,
    full_content: Option<String>,
}

impl ArticleCard {
    pub fn new(article: Article, logged_in: bool) -> Self {
        Self {
            likes: article.likes,
            dislikes: article.dislikes,
            article,
            logged_in,
            interaction: Interaction::None,
            expansion: Expansion::Collapsed,
            full_content: None,
        }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn likes(&self) -> i32 {
        self.likes
    }

    pub fn dislikes(&self) -> i32 {
        self.dislikes
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn full_content(&self) -> Option<&str> {
        self.full_content.as_deref()
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    pub fn image_url(&self) -> &str {
        if self.article.image_url.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.article.image_url
        }
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        time_ago(self.article.published_at, now)
    }

    /// Toggle a like. Replaces a dislike in the same step.
    pub fn like(&mut self) -> Result<Interaction, CardError> {
        if !self.logged_in {
            return Err(CardError::LoginRequired { prompt: LOGIN_TO_LIKE });
        }

        match self.interaction {
            Interaction::Liked => {
                self.likes -= 1;
                self.interaction = Interaction::None;
            }
            Interaction::Disliked => {
                self.dislikes -= 1;
                self.likes += 1;
                self.interaction = Interaction::Liked;
            }
            Interaction::None => {
                self.likes += 1;
                self.interaction = Interaction::Liked;
            }
        }

        debug!("Liked: {} -> {:?}", self.article.title, self.interaction);
        Ok(self.interaction)
    }

    /// Toggle a dislike. Replaces a like in the same step.
    pub fn dislike(&mut self) -> Result<Interaction, CardError> {
        if !self.logged_in {
            return Err(CardError::LoginRequired { prompt: LOGIN_TO_DISLIKE });
        }

        match self.interaction {
            Interaction::Disliked => {
                self.dislikes -= 1;
                self.interaction = Interaction::None;
            }
            Interaction::Liked => {
                self.likes -= 1;
                self.dislikes += 1;
                self.interaction = Interaction::Disliked;
            }
            Interaction::None => {
                self.dislikes += 1;
                self.interaction = Interaction::Disliked;
            }
        }

        debug!("Disliked: {} -> {:?}", self.article.title, self.interaction);
        Ok(self.interaction)
    }

    /// Move a collapsed card to `Expanding`. Returns false if it was not collapsed.
    pub fn begin_expand(&mut self) -> bool {
        if self.expansion != Expansion::Collapsed {
            return false;
        }
        self.expansion = Expansion::Expanding;
        true
    }

    /// Settle an expansion with the content fetch result. A failure still expands.
    pub fn finish_expand<E: std::fmt::Display>(&mut self, content: Result<String, E>) {
        if self.expansion != Expansion::Expanding {
            debug!("Ignoring content for {}: card no longer expanding", self.article.url);
            return;
        }

        self.full_content = Some(match content {
            Ok(body) => body,
            Err(e) => {
                warn!("Error fetching full article {}: {}", self.article.url, e);
                CONTENT_UNAVAILABLE.to_string()
            }
        });
        self.expansion = Expansion::Expanded;
    }

    /// Expand and fetch the full body through `extractor`. No-op unless collapsed.
    pub async fn expand(&mut self, extractor: &dyn ContentExtractor) -> Expansion {
        if self.begin_expand() {
            let content = extractor.extract(&self.article.url).await;
            self.finish_expand(content);
        }
        self.expansion
    }

    pub fn collapse(&mut self) {
        self.expansion = Expansion::Collapsed;
        self.full_content = None;
    }

    pub fn open_chat(&self) -> Result<ChatSession, CardError> {
        if !self.logged_in {
            return Err(CardError::LoginRequired { prompt: LOGIN_TO_CHAT });
        }
        Ok(ChatSession::new(&self.article))
    }
}
