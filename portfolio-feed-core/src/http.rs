use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// HTTP client with a per-request timeout and bounded retries.
///
/// Transport failures and 5xx responses are retried with exponential backoff;
/// any other non-success status is returned immediately as
/// [`FetchError::Status`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Sends the request, retrying transient failures, and returns the first success.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, FetchError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| FetchError::Client("request body cannot be cloned".into()))?
                .build()?;
            let url = request.url().to_string();
            debug!(attempt, %url, "sending HTTP request");

            let err = match self.client.execute(request).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => FetchError::Status {
                    status: response.status().as_u16(),
                    url,
                },
                Err(err) => FetchError::Transport(err),
            };

            if attempt >= attempts || !err.is_transient() {
                return Err(err);
            }
            debug!(attempt, error = %err, "transient HTTP failure, backing off");
            self.sleep_with_backoff(attempt).await;
        }
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.send(self.get(url)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            headers: HeaderMap::new(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self, FetchError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::Client(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    pub fn build(self) -> Result<HttpClient, FetchError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .default_headers(self.headers);
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts,
            base_backoff: self.base_backoff,
        })
    }
}
