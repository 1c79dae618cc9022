//! Error types for the storyreel core.
//!
//! The taxonomy separates precondition failures (rejected before any network
//! call), provider transport failures, schema-validation failures, and the
//! credential-invalid signal that forces re-selection of the active
//! credential.

use thiserror::Error;

use crate::pipeline::Stage;

/// Marker the content provider returns when the active credential no longer
/// resolves to a valid project.
const ENTITY_NOT_FOUND_MARKER: &str = "Requested entity was not found";

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoryreelError>;

/// The main error type for storyreel operations.
#[derive(Debug, Error)]
pub enum StoryreelError {
    /// A precondition check failed before any network call was made.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A provider transport error (HTTP or network failure).
    #[error("provider error: {message}")]
    Provider {
        /// The provider-supplied message.
        message: String,
    },

    /// The provider returned story text that does not match the expected
    /// schema. Distinct from a transport error.
    #[error("could not generate a valid story structure: {0}")]
    InvalidStory(String),

    /// The provider rejected the active credential. The caller must
    /// re-select a credential before retrying.
    #[error("credential rejected by provider: {0}")]
    CredentialInvalid(String),

    /// A video operation completed without a download link.
    #[error("video generation completed, but no download link was found")]
    MissingDownloadLink,

    /// A persistence backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage of the generation pipeline failed.
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        /// The stage that was executing when the failure occurred.
        stage: Stage,
        /// The underlying cause.
        source: Box<StoryreelError>,
    },
}

impl StoryreelError {
    /// Creates a provider error from a raw provider message, classifying
    /// the credential-invalid signal.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(ENTITY_NOT_FOUND_MARKER) {
            Self::CredentialInvalid(message)
        } else {
            Self::Provider { message }
        }
    }

    /// Creates a precondition error.
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Wraps this error with the stage that was executing when it occurred.
    #[must_use]
    pub fn at_stage(self, stage: Stage) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the stage recorded by [`StoryreelError::at_stage`], if any.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns true if this error (or its cause) is the credential-invalid
    /// signal.
    #[must_use]
    pub fn is_credential_invalid(&self) -> bool {
        match self {
            Self::CredentialInvalid(_) => true,
            Self::StageFailed { source, .. } => source.is_credential_invalid(),
            _ => false,
        }
    }

    /// Returns true if this error is a precondition failure.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_is_preserved() {
        let err = StoryreelError::provider("quota exceeded");
        assert_eq!(err.to_string(), "provider error: quota exceeded");
        assert!(!err.is_credential_invalid());
    }

    #[test]
    fn entity_not_found_classifies_as_credential_invalid() {
        let err = StoryreelError::provider("Requested entity was not found.");
        assert!(err.is_credential_invalid());
    }

    #[test]
    fn at_stage_names_the_stage() {
        let err = StoryreelError::provider("boom").at_stage(Stage::WritingStory);
        assert_eq!(err.stage(), Some(Stage::WritingStory));
        assert!(err.to_string().contains("writing_story"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn credential_invalid_survives_stage_wrapping() {
        let err = StoryreelError::provider("Requested entity was not found")
            .at_stage(Stage::GeneratingImages);
        assert!(err.is_credential_invalid());
    }

    #[test]
    fn precondition_is_detectable() {
        let err = StoryreelError::precondition("no credential selected");
        assert!(err.is_precondition());
        assert!(!err.is_credential_invalid());
    }
}
