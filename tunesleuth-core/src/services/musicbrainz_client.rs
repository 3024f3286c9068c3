//! MusicBrainz recording search client

use crate::config::MatcherSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Remote catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A searchable recording catalog
///
/// Implementations return each candidate as the raw JSON record so a
/// malformed entry can be skipped without discarding the whole response.
/// Throttling is the caller's job.
#[async_trait]
pub trait RecordingCatalog: Send + Sync {
    async fn search_recordings(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<serde_json::Value>,
}

/// MusicBrainz web service client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new(settings: &MatcherSettings) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RecordingCatalog for MusicBrainzClient {
    async fn search_recordings(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>, CatalogError> {
        let url = format!("{}/recording", self.base_url);
        tracing::debug!(query = %query, limit, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("limit", limit.to_string()),
                ("fmt", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == 503 {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let body: RecordingSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::debug!(count = body.recordings.len(), "Received recordings from MusicBrainz");

        Ok(body.recordings)
    }
}
