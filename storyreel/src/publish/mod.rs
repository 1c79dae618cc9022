//! The publish coordinator.
//!
//! Takes a completed run's two video segments and drives the publishing
//! provider through a create-collection, upload, upload, attach, attach
//! sequence. The sequence is not atomic: a failure mid-way leaves partial
//! remote state. Attach failures are best-effort and do not fail the
//! publish; they are reported on the outcome instead of being swallowed.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::PublishConfig;
use crate::credentials::TokenProvider;
use crate::errors::{Result, StoryreelError};
use crate::history::{PublishHistory, PublishRecord};
use crate::pipeline::PipelineRun;
use crate::providers::PublishingProvider;

/// A failed best-effort attach.
#[derive(Debug, Clone)]
pub struct AttachFailure {
    /// The item that could not be attached.
    pub item_id: String,
    /// The provider message.
    pub message: String,
}

/// The result of a successful publish.
///
/// `attach_failures` is non-empty when one or both items exist remotely
/// but could not be attached to the collection; the publish still counts
/// as successful and is not corrected automatically.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// The created collection identifier.
    pub collection_id: String,
    /// The uploaded item identifiers, in part order.
    pub item_ids: [String; 2],
    /// Attach steps that failed, if any.
    pub attach_failures: Vec<AttachFailure>,
}

impl PublishOutcome {
    /// Returns true if both items were attached to the collection.
    #[must_use]
    pub fn is_fully_attached(&self) -> bool {
        self.attach_failures.is_empty()
    }
}

/// Publishes a completed run's segments as a playlist.
///
/// At most one publish runs at a time; the caller disables its trigger
/// while one is in flight.
pub struct PublishCoordinator {
    provider: Arc<dyn PublishingProvider>,
    tokens: Arc<dyn TokenProvider>,
    history: Arc<PublishHistory>,
    config: PublishConfig,
}

impl PublishCoordinator {
    /// Creates a coordinator with the default configuration.
    #[must_use]
    pub fn new(
        provider: Arc<dyn PublishingProvider>,
        tokens: Arc<dyn TokenProvider>,
        history: Arc<PublishHistory>,
    ) -> Self {
        Self {
            provider,
            tokens,
            history,
            config: PublishConfig::default(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PublishConfig) -> Self {
        self.config = config;
        self
    }

    /// Publishes the run's two video segments.
    ///
    /// # Errors
    ///
    /// Returns a precondition error, with no network call, if the caller
    /// is not authenticated or the run does not hold a story and exactly
    /// two video segments. Collection creation and upload failures abort
    /// with no history record; attach failures do not.
    pub async fn publish(&self, run: &PipelineRun) -> Result<PublishOutcome> {
        if !self.tokens.is_authenticated() {
            return Err(StoryreelError::precondition(
                "not signed in to the publishing platform",
            ));
        }
        if run.videos.len() != 2 {
            return Err(StoryreelError::precondition(
                "videos are not available for upload",
            ));
        }
        let story = run
            .story
            .as_ref()
            .ok_or_else(|| StoryreelError::precondition("run has no story"))?;
        let topic = run
            .trend
            .as_deref()
            .ok_or_else(|| StoryreelError::precondition("run has no trend topic"))?;

        let token = self.tokens.access_token()?;

        let collection_id = self
            .provider
            .create_collection(
                &token,
                &format!("{}{}", self.config.title_prefix, story.title),
                &format!(
                    "An AI-generated two-part video story based on the trend: \"{topic}\"."
                ),
            )
            .await?;
        info!(collection_id = %collection_id, "collection created");

        let mut item_ids = Vec::with_capacity(2);
        for (part, video) in run.videos.iter().enumerate() {
            let part = part + 1;
            let item_id = self
                .provider
                .upload_item(
                    &token,
                    video.bytes.clone(),
                    &format!("{} - Part {part}", story.title),
                    &format!("Part {part} of the story. Trend: {topic}"),
                )
                .await?;
            info!(item_id = %item_id, part, "item uploaded");
            item_ids.push(item_id);
        }

        let mut attach_failures = Vec::new();
        for item_id in &item_ids {
            if let Err(err) = self
                .provider
                .attach_item(&token, &collection_id, item_id)
                .await
            {
                warn!(item_id = %item_id, error = %err, "item could not be attached to collection");
                attach_failures.push(AttachFailure {
                    item_id: item_id.clone(),
                    message: err.to_string(),
                });
            }
        }

        let record = PublishRecord::new(
            collection_id.clone(),
            item_ids.clone(),
            story.title.clone(),
            topic,
        );
        if let Err(err) = self.history.append(record) {
            warn!(error = %err, "publish succeeded but history could not be persisted");
        }

        let [first, second] = <[String; 2]>::try_from(item_ids)
            .map_err(|_| StoryreelError::provider("expected exactly two uploaded items"))?;
        Ok(PublishOutcome {
            collection_id,
            item_ids: [first, second],
            attach_failures,
        })
    }
}
