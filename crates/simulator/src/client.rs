//! HTTP client for the ingest endpoint.

use std::time::Duration;

use crate::profile::ReadingBatch;

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "x-api-key";

/// HTTP request timeout for a single post.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Ingest returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Posts reading batches with a project API key.
pub struct IngestClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl IngestClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: ingest_url(base_url),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one batch. Returns how many readings the server stored.
    pub async fn send(&self, batch: &ReadingBatch) -> Result<u64, IngestError> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(batch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        Ok(json["count"].as_u64().unwrap_or(0))
    }
}

/// Ingest endpoint under `base_url`, tolerating a trailing slash.
pub fn ingest_url(base_url: &str) -> String {
    format!("{}/api/v1/sensor-data", base_url.trim_end_matches('/'))
}
