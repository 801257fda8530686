use crate::types::Article;

pub const GREETING: &str = "Hi! I can help you understand this article better. What would you like to know?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub from_user: bool,
}

/// Conversation pane attached to one article card.
#[derive(Debug, Clone)]
pub struct ChatSession {
    article_url: String,
    article_title: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(article: &Article) -> Self {
        Self {
            article_url: article.url.clone(),
            article_title: article.title.clone(),
            messages: vec![ChatMessage {
                text: GREETING.to_string(),
                from_user: false,
            }],
        }
    }

    pub fn article_url(&self) -> &str {
        &self.article_url
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and the assistant reply. Blank input is ignored.
    pub fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage {
            text: input.to_string(),
            from_user: true,
        });
        self.messages.push(ChatMessage {
            text: format!(
                "Thanks for asking about \"{}\". Detailed answers for this article are not available yet.",
                self.article_title
            ),
            from_user: false,
        });
        self.messages.last()
    }
}
