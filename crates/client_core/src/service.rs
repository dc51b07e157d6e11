//! The query service seam and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::protocol::{QueryRequest, QueryResponse};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::{ClientSettings, SettingsError};

/// Every way a turn can fail to produce an answer. The UI shows all of these
/// the same way; the variants exist for operator logs.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("query request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("query service returned status {0}")]
    Status(StatusCode),
    #[error("failed to decode query response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait QueryService: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpQueryService {
    http: Client,
    endpoint: Url,
}

impl HttpQueryService {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpServiceError> {
        let endpoint = settings.endpoint_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Debug, Error)]
pub enum HttpServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let body = response.bytes().await?;
        debug!(status = %status, bytes = body.len(), "query response received");
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
