//! Content provider backed by the Google Generative Language API.
//!
//! Trend discovery and story writing go through `generateContent` (the
//! former with search grounding, the latter with a JSON response schema),
//! images through the Imagen `predict` endpoint, and video segments
//! through the Veo long-running `predictLongRunning` endpoint plus
//! operation polling.

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::errors::{Result, StoryreelError};
use crate::pipeline::Story;
use crate::providers::{ContentProvider, VideoOperation, VideoPoll, VideoRequest};

const TREND_PROMPT: &str = "What is a single, specific, and crazy trend popular among the \
     young generation on social media right now? Be very specific and just name the trend.";

/// Configuration for the Generative Language client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Project-scoped API key.
    pub api_key: String,
    /// Model for trend discovery and story writing.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model for image generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Model for video generation.
    #[serde(default = "default_video_model")]
    pub video_model: String,
    /// Style prefix applied to every image prompt.
    #[serde(default = "default_image_style")]
    pub image_style_prefix: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_image_style() -> String {
    "hyper-realistic, cinematic, 8k, detailed".to_string()
}

fn default_timeout() -> f64 {
    120.0
}

impl GeminiConfig {
    /// Creates a configuration for the given API key, with defaults for
    /// everything else.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: default_api_base(),
            api_key: api_key.into(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            image_style_prefix: default_image_style(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Generative Language API client implementing [`ContentProvider`].
#[derive(Debug, Clone)]
pub struct GeminiContent {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiContent {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the HTTP client cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .build()
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn keyed_url(&self, path: &str) -> String {
        format!(
            "{}/{}?key={}",
            self.config.api_base, path, self.config.api_key
        )
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        Self::decode(response).await
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

    fn first_text(response: GenerateContentResponse) -> Result<String> {
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .find(|t| !t.is_empty())
            .ok_or_else(|| StoryreelError::provider("empty model response"))
    }

    fn image_part(payload: &str) -> serde_json::Value {
        json!({ "bytesBase64Encoded": payload, "mimeType": "image/jpeg" })
    }
}

/// Digs the download link out of a completed operation response.
///
/// Both the `generatedSamples` and `generatedVideos` response shapes are
/// accepted.
fn extract_download_link(response: &serde_json::Value) -> Option<String> {
    let video_response = response.get("generateVideoResponse").unwrap_or(response);
    for key in ["generatedSamples", "generatedVideos"] {
        if let Some(entry) = video_response.get(key).and_then(|v| v.get(0)) {
            if let Some(uri) = entry
                .pointer("/video/uri")
                .and_then(serde_json::Value::as_str)
            {
                return Some(uri.to_string());
            }
        }
    }
    None
}

#[async_trait]
impl ContentProvider for GeminiContent {
    async fn trend_topic(&self) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": TREND_PROMPT }] }],
            "tools": [{ "google_search": {} }],
        });
        let url = self.keyed_url(&format!("models/{}:generateContent", self.config.text_model));
        let response: GenerateContentResponse = self.post_json(&url, &body).await?;
        Ok(Self::first_text(response)?.trim().to_string())
    }

    async fn story_for(&self, topic: &str) -> Result<Story> {
        let prompt = format!(
            "Create a crazy, two-part short story based on the trend: \"{topic}\". \
             The story must have a clear title. \
             Part 1 should introduce the world and characters, building up suspense \
             and leading to a major turning point. \
             Part 2 should start from that turning point, introduce a twist, and lead \
             to a definitive, surprising conclusion. \
             Format the output as a JSON object with keys: \"title\", \"part1\", and \"part2\"."
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "part1": { "type": "STRING" },
                        "part2": { "type": "STRING" },
                    },
                    "required": ["title", "part1", "part2"],
                },
            },
        });
        let url = self.keyed_url(&format!("models/{}:generateContent", self.config.text_model));
        let response: GenerateContentResponse = self.post_json(&url, &body).await?;
        let text = Self::first_text(response)?;
        serde_json::from_str(text.trim())
            .map_err(|err| StoryreelError::InvalidStory(err.to_string()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "instances": [{
                "prompt": format!("{}: {prompt}", self.config.image_style_prefix),
            }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "16:9",
                "outputMimeType": "image/jpeg",
            },
        });
        let url = self.keyed_url(&format!("models/{}:predict", self.config.image_model));
        let response: PredictResponse = self.post_json(&url, &body).await?;
        let payload = response
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .ok_or_else(|| StoryreelError::provider("no image in response"))?;
        let decoded = BASE64_STANDARD
            .decode(&payload)
            .map_err(|err| StoryreelError::provider(format!("invalid image payload: {err}")))?;
        debug!(bytes = decoded.len(), "image generated");
        Ok(payload)
    }

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation> {
        let body = json!({
            "instances": [{
                "prompt": request.prompt,
                "image": Self::image_part(&request.start_image),
                "lastFrame": Self::image_part(&request.end_image),
            }],
            "parameters": {
                "sampleCount": 1,
                "resolution": "720p",
                "aspectRatio": request.aspect_ratio.as_str(),
            },
        });
        let url = self.keyed_url(&format!(
            "models/{}:predictLongRunning",
            self.config.video_model
        ));
        let operation: OperationName = self.post_json(&url, &body).await?;
        Ok(VideoOperation::new(operation.name))
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoPoll> {
        let url = self.keyed_url(&operation.name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        let status: OperationStatus = Self::decode(response).await?;
        if !status.done {
            return Ok(VideoPoll::pending());
        }
        Ok(match extract_download_link(&status.response) {
            Some(link) => VideoPoll::done_with_link(link),
            None => VideoPoll::done_without_link(),
        })
    }

    async fn fetch_video(&self, download_link: &str) -> Result<Vec<u8>> {
        // The download link already carries query parameters; the key is
        // appended alongside them.
        let url = format!("{download_link}&key={}", self.config.api_key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        if !response.status().is_success() {
            return Err(StoryreelError::provider(format!(
                "failed to download the generated video: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| StoryreelError::provider(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GeminiConfig::new("key-123");
        assert_eq!(config.text_model, "gemini-2.5-pro");
        assert_eq!(config.image_model, "imagen-4.0-generate-001");
        assert_eq!(config.video_model, "veo-3.1-fast-generate-preview");
        assert!(config.api_base.starts_with("https://"));
    }

    #[test]
    fn config_deserializes_with_only_key() {
        let config: GeminiConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout_seconds, 120.0);
    }

    #[test]
    fn extract_link_from_generated_samples() {
        let response = json!({
            "generateVideoResponse": {
                "generatedSamples": [{ "video": { "uri": "https://dl.example/v" } }]
            }
        });
        assert_eq!(
            extract_download_link(&response).as_deref(),
            Some("https://dl.example/v")
        );
    }

    #[test]
    fn extract_link_from_generated_videos() {
        let response = json!({
            "generatedVideos": [{ "video": { "uri": "https://dl.example/w" } }]
        });
        assert_eq!(
            extract_download_link(&response).as_deref(),
            Some("https://dl.example/w")
        );
    }

    #[test]
    fn extract_link_missing_is_none() {
        assert_eq!(extract_download_link(&json!({})), None);
        let linkless = json!({
            "generateVideoResponse": { "generatedSamples": [{ "video": {} }] }
        });
        assert_eq!(extract_download_link(&linkless), None);
    }

    #[test]
    fn first_text_skips_empty_candidates() {
        let response = GenerateContentResponse {
            candidates: vec![
                Candidate { content: None },
                Candidate {
                    content: Some(CandidateContent {
                        parts: vec![
                            TextPart { text: String::new() },
                            TextPart {
                                text: "a trend".to_string(),
                            },
                        ],
                    }),
                },
            ],
        };
        assert_eq!(GeminiContent::first_text(response).unwrap(), "a trend");
    }
}
