use crate::types::{AggregatorError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Shared HTTP client for providers and collaborators.
///
/// Idempotent GETs are retried with exponential backoff on transport errors,
/// 429 and 5xx. Anything else is reported to the caller on the first attempt.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.get_with_retry(url, query, headers).await?;
        let body = response.text().await?;
        let decoded = serde_json::from_str(&body)?;
        Ok(decoded)
    }

    /// GET the raw body of an article page.
    pub async fn fetch_full_content(&self, url: &str) -> Result<String> {
        debug!("Fetching full content from: {}", url);
        let response = self.get_with_retry(url, &[], &[]).await?;
        let content = response.text().await?;
        info!("Fetched full content from {} ({} bytes)", url, content.len());
        Ok(content)
    }

    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let start_time = Instant::now();
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: retry_delay,
            initial_interval: retry_delay,
            max_interval: retry_delay * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(retry_delay * 60),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let mut request = self.client.get(url).query(query);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        self.check_size(&response)?;
                        debug!(
                            "GET {} -> {} in {}ms",
                            url,
                            status,
                            start_time.elapsed().as_millis()
                        );
                        return Ok(response);
                    }

                    let status_error = AggregatorError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                    };
                    if !is_retryable(status) {
                        warn!("GET {} failed with {}, not retrying", url, status);
                        return Err(status_error);
                    }
                    last_error = Some(status_error);
                }
                Err(e) => {
                    last_error = Some(AggregatorError::Http(e));
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        error!("Failed to fetch {} after {} attempts", url, self.config.max_retries + 1);
        Err(last_error.unwrap_or_else(|| AggregatorError::General(format!("no response from {}", url))))
    }

    fn check_size(&self, response: &Response) -> Result<()> {
        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_response_size_mb {
                return Err(AggregatorError::ResponseTooLarge { size_mb });
            }
        }
        Ok(())
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
