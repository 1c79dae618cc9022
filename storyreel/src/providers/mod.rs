//! Capability traits for the external collaborators.
//!
//! These traits abstract the concrete vendor APIs so the core never
//! depends on a vendor client shape. Concrete implementations live in
//! [`gemini`] and [`youtube`]; test doubles live in [`crate::testing`].

pub mod gemini;
pub mod youtube;

use async_trait::async_trait;

use crate::errors::Result;
use crate::pipeline::{AspectRatio, Story};

/// An opaque, pollable reference to a long-running provider-side video
/// generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    /// The provider-assigned operation name.
    pub name: String,
}

impl VideoOperation {
    /// Wraps a provider operation name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One poll of a video operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPoll {
    /// True once the provider reports the job finished.
    pub done: bool,
    /// The download link, present only on a completed job that produced
    /// output.
    pub download_link: Option<String>,
}

impl VideoPoll {
    /// A still-running poll result.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// A completed poll result carrying a download link.
    #[must_use]
    pub fn done_with_link(link: impl Into<String>) -> Self {
        Self {
            done: true,
            download_link: Some(link.into()),
        }
    }

    /// A completed poll result with no download link.
    #[must_use]
    pub fn done_without_link() -> Self {
        Self {
            done: true,
            download_link: None,
        }
    }
}

/// Inputs for one video segment generation.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// The narrative prompt for the segment.
    pub prompt: String,
    /// Encoded start frame.
    pub start_image: String,
    /// Encoded end frame.
    pub end_image: String,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
}

/// Drives trend discovery, story writing, and media generation.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Requests a single freeform trend topic.
    async fn trend_topic(&self) -> Result<String>;

    /// Requests a structured story for the topic, validated against the
    /// three-field schema.
    async fn story_for(&self, topic: &str) -> Result<Story>;

    /// Generates one image for the prompt, returned as an encoded payload.
    async fn generate_image(&self, prompt: &str) -> Result<String>;

    /// Submits a video generation job.
    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation>;

    /// Checks a video generation job's completion status.
    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoPoll>;

    /// Fetches the finished video bytes from a download link.
    async fn fetch_video(&self, download_link: &str) -> Result<Vec<u8>>;
}

/// Creates collections and uploads items on the publishing platform.
///
/// Every call takes the caller's current access token; the provider holds
/// no sign-in state of its own.
#[async_trait]
pub trait PublishingProvider: Send + Sync {
    /// Creates a new private collection, returning its identifier.
    async fn create_collection(
        &self,
        access_token: &str,
        title: &str,
        description: &str,
    ) -> Result<String>;

    /// Uploads one private item, returning its identifier.
    async fn upload_item(
        &self,
        access_token: &str,
        bytes: Vec<u8>,
        title: &str,
        description: &str,
    ) -> Result<String>;

    /// Attaches an item to a collection. Best-effort from the caller's
    /// perspective.
    async fn attach_item(
        &self,
        access_token: &str,
        collection_id: &str,
        item_id: &str,
    ) -> Result<()>;
}
