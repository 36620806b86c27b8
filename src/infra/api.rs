//! Thin asynchronous client for the transport-request backend.
//!
//! Every endpoint answers with a `{ success, data?, message? }` envelope;
//! a `success: false` reply is surfaced as [`ApiClientError::Api`] carrying
//! the server's message.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::SubmittedRequest;
use crate::util::{config::AppConfig, version::user_agent};

const REQUESTS_PATH: &str = "transport-requests";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response status {0}")]
    Status(StatusCode),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// Where a finished request is handed off for persistence.
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Returns the record as stored by the backend.
    async fn submit(&self, record: &SubmittedRequest) -> Result<SubmittedRequest, ApiClientError>;
}

#[derive(Clone)]
pub struct TransportApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl TransportApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: parse_base(&config.api_url)?,
            token: config.api_token.clone(),
        })
    }

    pub fn with_base_url(base: &str) -> Result<Self, ApiClientError> {
        let config = AppConfig {
            api_url: base.to_string(),
            ..AppConfig::default()
        };
        Self::new(&config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn submit_request(
        &self,
        record: &SubmittedRequest,
    ) -> Result<SubmittedRequest, ApiClientError> {
        let url = self.url(REQUESTS_PATH)?;
        info!(id = %record.id, cost = record.estimated_cost, "submitting transport request");

        let builder = self
            .authorized(self.http.post(url))
            .header(IDEMPOTENCY_HEADER, record.id.as_str())
            .json(record);

        let stored = self.fetch_optional::<SubmittedRequest>(builder).await?;
        if stored.is_none() {
            debug!(id = %record.id, "backend accepted request without echoing it");
        }
        Ok(stored.unwrap_or_else(|| record.clone()))
    }

    pub async fn list_requests(&self) -> Result<Vec<SubmittedRequest>, ApiClientError> {
        let url = self.url(REQUESTS_PATH)?;
        let requests = self
            .fetch_optional::<Vec<SubmittedRequest>>(self.authorized(self.http.get(url)))
            .await?
            .unwrap_or_default();
        debug!(count = requests.len(), "loaded transport requests");
        Ok(requests)
    }

    pub async fn get_request(&self, id: &str) -> Result<SubmittedRequest, ApiClientError> {
        let mut url = self.url(REQUESTS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiClientError::Api("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push(id);

        self.fetch_optional(self.authorized(self.http.get(url)))
            .await?
            .ok_or_else(|| ApiClientError::Api("response missing data".into()))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_optional<T>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if envelope.success && status.is_success() => Ok(envelope.data),
            Ok(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| format!("request failed with status {status}"));
                warn!(%status, "backend rejected request: {message}");
                Err(ApiClientError::Api(message))
            }
            Err(err) if status.is_success() => Err(ApiClientError::Decode(err)),
            Err(_) => {
                warn!(%status, "backend returned a non-envelope error");
                Err(ApiClientError::Status(status))
            }
        }
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl RequestGateway for TransportApiClient {
    async fn submit(&self, record: &SubmittedRequest) -> Result<SubmittedRequest, ApiClientError> {
        self.submit_request(record).await
    }
}

/// `Url::join` drops the last segment unless the base ends with a slash.
fn parse_base(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}
