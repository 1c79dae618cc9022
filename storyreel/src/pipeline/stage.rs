//! The generation pipeline stage enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete step of the generation pipeline.
///
/// Stages are strictly ordered: only forward transitions occur on success,
/// and any failure resets the pipeline to [`Stage::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No run is active.
    #[default]
    Idle,
    /// Discovering a trend topic.
    FindingTrend,
    /// Writing the two-part story.
    WritingStory,
    /// Generating the three key-frame images.
    GeneratingImages,
    /// Generating the first video segment.
    GeneratingVideo1,
    /// Generating the second video segment.
    GeneratingVideo2,
    /// Terminal success state.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FindingTrend => write!(f, "finding_trend"),
            Self::WritingStory => write!(f, "writing_story"),
            Self::GeneratingImages => write!(f, "generating_images"),
            Self::GeneratingVideo1 => write!(f, "generating_video_1"),
            Self::GeneratingVideo2 => write!(f, "generating_video_2"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl Stage {
    /// Returns true if a run is in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle | Self::Done)
    }

    /// Returns true if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Idle | Self::Done)
    }

    /// Returns the 1-based position of a working stage, for step
    /// indicators. `Idle` is 0 and `Done` is one past the last step.
    #[must_use]
    pub fn step_index(&self) -> usize {
        match self {
            Self::Idle => 0,
            Self::FindingTrend => 1,
            Self::WritingStory => 2,
            Self::GeneratingImages => 3,
            Self::GeneratingVideo1 => 4,
            Self::GeneratingVideo2 => 5,
            Self::Done => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_snake_case() {
        assert_eq!(Stage::FindingTrend.to_string(), "finding_trend");
        assert_eq!(Stage::GeneratingVideo2.to_string(), "generating_video_2");
    }

    #[test]
    fn busy_and_terminal_are_complementary() {
        for stage in [
            Stage::Idle,
            Stage::FindingTrend,
            Stage::WritingStory,
            Stage::GeneratingImages,
            Stage::GeneratingVideo1,
            Stage::GeneratingVideo2,
            Stage::Done,
        ] {
            assert_eq!(stage.is_busy(), !stage.is_terminal());
        }
    }

    #[test]
    fn step_indices_are_strictly_ordered() {
        let order = [
            Stage::Idle,
            Stage::FindingTrend,
            Stage::WritingStory,
            Stage::GeneratingImages,
            Stage::GeneratingVideo1,
            Stage::GeneratingVideo2,
            Stage::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].step_index() < pair[1].step_index());
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Stage::GeneratingImages).unwrap();
        assert_eq!(json, r#""generating_images""#);
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Stage::GeneratingImages);
    }
}
