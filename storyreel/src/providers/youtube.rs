//! Publishing provider backed by the YouTube Data API.
//!
//! Playlists map to collections and videos to items. Uploads use the
//! multipart upload endpoint with a JSON metadata part and a media part;
//! everything is created private.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::errors::{Result, StoryreelError};
use crate::providers::PublishingProvider;

/// Renders the public collection-view link for a playlist.
#[must_use]
pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={playlist_id}")
}

/// Configuration for the YouTube Data client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Data API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Upload API base URL.
    #[serde(default = "default_upload_base")]
    pub upload_base: String,
    /// Request timeout in seconds. Uploads carry whole video payloads, so
    /// this is generous.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_upload_base() -> String {
    "https://www.googleapis.com/upload/youtube/v3".to_string()
}

fn default_timeout() -> f64 {
    600.0
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            upload_base: default_upload_base(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl YouTubeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both base URLs to the same host, for tests against a local
    /// server.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.api_base.clone_from(&base);
        self.upload_base = base;
        self
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// YouTube Data API client implementing [`PublishingProvider`].
#[derive(Debug, Clone)]
pub struct YouTubeData {
    client: reqwest::Client,
    config: YouTubeConfig,
}

impl YouTubeData {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the HTTP client cannot be constructed.
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .build()
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        Ok(Self { client, config })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .ok()
                .and_then(|body| body.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(StoryreelError::provider(message));
        }
        serde_json::from_str(&raw).map_err(StoryreelError::from)
    }
}

#[async_trait]
impl PublishingProvider for YouTubeData {
    async fn create_collection(
        &self,
        access_token: &str,
        title: &str,
        description: &str,
    ) -> Result<String> {
        let body = json!({
            "snippet": { "title": title, "description": description },
            "status": { "privacyStatus": "private" },
        });
        let response = self
            .client
            .post(format!(
                "{}/playlists?part=snippet,status",
                self.config.api_base
            ))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        let created: IdResponse = Self::decode(response).await?;
        Ok(created.id)
    }

    async fn upload_item(
        &self,
        access_token: &str,
        bytes: Vec<u8>,
        title: &str,
        description: &str,
    ) -> Result<String> {
        let metadata = json!({
            "snippet": { "title": title, "description": description },
            "status": { "privacyStatus": "private" },
        });
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|err| StoryreelError::provider(err.to_string()))?,
            )
            .part(
                "video",
                reqwest::multipart::Part::bytes(bytes)
                    .mime_str("video/mp4")
                    .map_err(|err| StoryreelError::provider(err.to_string()))?,
            );
        let response = self
            .client
            .post(format!(
                "{}/videos?part=snippet,status&uploadType=multipart",
                self.config.upload_base
            ))
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        let uploaded: IdResponse = Self::decode(response).await?;
        Ok(uploaded.id)
    }

    async fn attach_item(
        &self,
        access_token: &str,
        collection_id: &str,
        item_id: &str,
    ) -> Result<()> {
        let body = json!({
            "snippet": {
                "playlistId": collection_id,
                "resourceId": { "kind": "youtube#video", "videoId": item_id },
            },
        });
        let response = self
            .client
            .post(format!(
                "{}/playlistItems?part=snippet",
                self.config.api_base
            ))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_url_format() {
        assert_eq!(
            playlist_url("PLabc123"),
            "https://www.youtube.com/playlist?list=PLabc123"
        );
    }

    #[test]
    fn config_defaults() {
        let config = YouTubeConfig::default();
        assert!(config.api_base.ends_with("/youtube/v3"));
        assert!(config.upload_base.contains("/upload/"));
    }

    #[test]
    fn with_base_points_both_hosts() {
        let config = YouTubeConfig::new().with_base("http://127.0.0.1:9999");
        assert_eq!(config.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.upload_base, "http://127.0.0.1:9999");
    }

    #[test]
    fn error_body_parses_message() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"message":"quota exceeded","code":403}}"#).unwrap();
        assert_eq!(
            body.error.and_then(|e| e.message).as_deref(),
            Some("quota exceeded")
        );
    }
}
