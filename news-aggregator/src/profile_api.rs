use crate::types::{AggregatorError, InterestPoint, ProfileUpdate, Result, SurveyQuestion, User};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Request/response JSON endpoints behind the profile panel.
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn interest_data(&self) -> Result<Vec<InterestPoint>>;
    async fn submit_survey(&self, questions: &[SurveyQuestion]) -> Result<()>;
    async fn update_survey_response(&self, id: &str, rating: u8) -> Result<()>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User>;
}

#[derive(Serialize)]
struct SurveyResponseBody<'a> {
    id: &'a str,
    rating: u8,
}

pub struct ProfileApi {
    client: Client,
    base_url: Url,
}

impl ProfileApi {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} -> {}", path, status);

        if !status.is_success() {
            warn!("{} failed with {}", path, status);
            return Err(AggregatorError::Status {
                status: status.as_u16(),
                url: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProfileBackend for ProfileApi {
    async fn interest_data(&self) -> Result<Vec<InterestPoint>> {
        let path = "/api/interest-data";
        let response = self.send(self.client.get(self.endpoint(path)?), path).await?;
        Self::decode(response).await
    }

    async fn submit_survey(&self, questions: &[SurveyQuestion]) -> Result<()> {
        let path = "/api/submit-survey";
        self.send(self.client.post(self.endpoint(path)?).json(questions), path)
            .await?;
        Ok(())
    }

    async fn update_survey_response(&self, id: &str, rating: u8) -> Result<()> {
        let path = "/api/update-survey";
        self.send(
            self.client
                .post(self.endpoint(path)?)
                .json(&SurveyResponseBody { id, rating }),
            path,
        )
        .await?;
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let path = "/api/update-profile";
        let response = self
            .send(self.client.put(self.endpoint(path)?).json(update), path)
            .await?;
        Self::decode(response).await
    }
}
