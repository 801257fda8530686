use crate::config::IdentityConfig;
use crate::types::AggregatorError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";
pub const PASSWORD_POLICY_MESSAGE: &str =
    "Password must be at least 8 characters long and include a number and a special character.";

/// Categories a new account can subscribe to.
pub const NEWS_CATEGORIES: [&str; 7] = [
    "Politics",
    "Technology",
    "Business",
    "Sports",
    "Entertainment",
    "Science",
    "Health",
];

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{}", PASSWORD_POLICY_MESSAGE)]
    WeakPassword,

    #[error("email is required")]
    MissingEmail,

    #[error("identity service rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] AggregatorError),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Transport(AggregatorError::Http(e))
    }
}

impl From<url::ParseError> for AuthError {
    fn from(e: url::ParseError) -> Self {
        AuthError::Transport(AggregatorError::InvalidUrl(e))
    }
}

/// At least eight characters, one digit and one special character.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LENGTH
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c))
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    pub preferences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    username: &'a str,
    mobile_number: &'a str,
    preferences: &'a [String],
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error_description", alias = "msg")]
    message: Option<String>,
}

/// Client for the identity service's password sign-in and sign-up endpoints.
pub struct IdentityClient {
    client: Client,
    base_url: Url,
    anon_key: String,
}

impl IdentityClient {
    pub fn new(client: Client, config: &IdentityConfig) -> Result<Self, AuthError> {
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            anon_key: config.anon_key.clone(),
        })
    }

    /// Password sign-in. The email is trimmed before it is sent.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }

        let mut url = self.base_url.join("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = Self::error_message(response).await;
            error!("Login error for {}: {}", email, reason);
            return Err(AuthError::Rejected(reason));
        }

        let session: AuthSession = response.json().await?;
        info!("Login successful for {}", email);
        Ok(session)
    }

    /// Create an account. The password policy is checked before any request is made.
    pub async fn sign_up(&self, registration: &Registration) -> Result<(), AuthError> {
        if !validate_password(&registration.password) {
            return Err(AuthError::WeakPassword);
        }

        let email = registration.email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }

        let body = SignUpBody {
            email,
            password: &registration.password,
            data: SignUpMetadata {
                username: &registration.username,
                mobile_number: &registration.mobile_number,
                preferences: &registration.preferences,
            },
        };

        let response = self
            .client
            .post(self.base_url.join("/auth/v1/signup")?)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = Self::error_message(response).await;
            error!("Registration error for {}: {}", email, reason);
            return Err(AuthError::Rejected(reason));
        }

        info!("Registered {}", email);
        Ok(())
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("HTTP {}", status))
    }
}
