//! Value types accumulated by a generation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::Result;
use crate::pipeline::Stage;

/// Output aspect ratio for generated video segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the provider wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A two-part story with a title.
///
/// All three fields are required; a provider response missing any of them
/// fails schema validation rather than producing a partial story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// The story title.
    pub title: String,
    /// Part 1: setup leading to the turning point.
    pub part1: String,
    /// Part 2: from the turning point to the conclusion.
    pub part2: String,
}

/// Prompts for the three key-frame images, derived deterministically from
/// the story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompts {
    /// Opening frame prompt.
    pub start: String,
    /// Turning-point frame prompt.
    pub middle: String,
    /// Conclusion frame prompt.
    pub end: String,
}

impl ImagePrompts {
    /// Derives the three prompts from a story.
    ///
    /// Both the turning-point and conclusion prompts draw on `part2`, with
    /// different framing text.
    #[must_use]
    pub fn from_story(story: &Story) -> Self {
        Self {
            start: format!(
                "A cinematic shot representing the beginning of this story: {}",
                story.part1
            ),
            middle: format!(
                "A cinematic shot representing the pivotal turning point of this story, \
                 bridging the two parts: {}",
                story.part2
            ),
            end: format!(
                "A cinematic shot representing the dramatic conclusion of this story: {}",
                story.part2
            ),
        }
    }
}

/// A generated video segment: the raw bytes plus a playback reference the
/// presentation layer can resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoArtifact {
    /// The raw media bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// A reference the presentation layer can play back. Starts as the
    /// provider download link; [`VideoArtifact::save_to`] replaces it with
    /// a local file path.
    pub playback_ref: String,
}

impl VideoArtifact {
    /// Creates an artifact whose playback reference is the provider
    /// download link.
    #[must_use]
    pub fn new(bytes: Vec<u8>, download_link: impl Into<String>) -> Self {
        Self {
            bytes,
            playback_ref: download_link.into(),
        }
    }

    /// Writes the bytes under `dir` and repoints the playback reference at
    /// the written file.
    pub fn save_to(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, &self.bytes)?;
        self.playback_ref = path.to_string_lossy().into_owned();
        Ok(path)
    }
}

/// The accumulated state of one generation run.
///
/// Stages populate strictly in order: `videos[1]` cannot exist unless
/// `images` has exactly 3 entries and `videos[0]` exists. The run is
/// replaced, not mutated, by the presentation layer after each successful
/// stage; a new run start or page teardown discards it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique id for this run, used for log correlation and media file
    /// naming.
    pub run_id: Uuid,
    /// The stage the run has most recently entered.
    pub stage: Stage,
    /// The discovered trend topic.
    pub trend: Option<String>,
    /// The generated story.
    pub story: Option<Story>,
    /// Up to three encoded image payloads, in start/middle/end order.
    pub images: Vec<String>,
    /// Up to two video segments, in part order.
    pub videos: Vec<VideoArtifact>,
    /// When the run started.
    pub started_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Creates an empty run with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stage: Stage::Idle,
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Returns true if both video segments are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.videos.len() == 2
    }

    /// Checks the stage-ordering invariant over the accumulated fields.
    #[must_use]
    pub fn ordering_holds(&self) -> bool {
        if !self.videos.is_empty() && self.images.len() != 3 {
            return false;
        }
        if self.images.len() > 3 || self.videos.len() > 2 {
            return false;
        }
        if !self.images.is_empty() && self.story.is_none() {
            return false;
        }
        if self.story.is_some() && self.trend.as_deref().unwrap_or("").is_empty() {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_story() -> Story {
        Story {
            title: "The Midnight Market".to_string(),
            part1: "A hidden market appears at midnight.".to_string(),
            part2: "The vendors are revealed to be ghosts.".to_string(),
        }
    }

    #[test]
    fn aspect_ratio_wire_format() {
        assert_eq!(AspectRatio::Landscape.as_str(), "16:9");
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait).unwrap(),
            r#""9:16""#
        );
        let parsed: AspectRatio = serde_json::from_str(r#""16:9""#).unwrap();
        assert_eq!(parsed, AspectRatio::Landscape);
    }

    #[test]
    fn story_requires_all_fields() {
        let err = serde_json::from_str::<Story>(r#"{"title":"t","part1":"a"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn image_prompts_derive_from_story_parts() {
        let prompts = ImagePrompts::from_story(&sample_story());
        assert!(prompts.start.ends_with("A hidden market appears at midnight."));
        assert!(prompts.middle.ends_with("The vendors are revealed to be ghosts."));
        // The conclusion prompt reuses part2, same as the turning point.
        assert!(prompts.end.ends_with("The vendors are revealed to be ghosts."));
        assert_ne!(prompts.middle, prompts.end);
    }

    #[test]
    fn new_run_is_empty_and_ordered() {
        let run = PipelineRun::new();
        assert_eq!(run.stage, Stage::Idle);
        assert!(run.trend.is_none());
        assert!(run.images.is_empty());
        assert!(!run.is_complete());
        assert!(run.ordering_holds());
    }

    #[test]
    fn ordering_rejects_videos_without_full_image_set() {
        let run = PipelineRun {
            trend: Some("trend".to_string()),
            story: Some(sample_story()),
            images: vec!["a".to_string(), "b".to_string()],
            videos: vec![VideoArtifact::new(vec![1], "link")],
            ..PipelineRun::new()
        };
        assert!(!run.ordering_holds());
    }

    #[test]
    fn ordering_rejects_images_without_story() {
        let run = PipelineRun {
            trend: Some("trend".to_string()),
            images: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..PipelineRun::new()
        };
        assert!(!run.ordering_holds());
    }

    #[test]
    fn save_to_repoints_playback_ref() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = VideoArtifact::new(vec![0, 1, 2], "https://example.com/v.mp4");
        let path = artifact.save_to(dir.path(), "part-1.mp4").unwrap();
        assert_eq!(artifact.playback_ref, path.to_string_lossy());
        assert_eq!(std::fs::read(path).unwrap(), vec![0, 1, 2]);
    }
}
