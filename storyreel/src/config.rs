//! Configuration for the generation pipeline and publish coordinator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seconds between video operation polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    /// Directory to save finished video segments into. When unset, the
    /// artifact playback reference stays on the provider download link.
    #[serde(default)]
    pub media_dir: Option<PathBuf>,
}

fn default_poll_interval() -> f64 {
    10.0
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            media_dir: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval in seconds.
    #[must_use]
    pub fn with_poll_interval(mut self, seconds: f64) -> Self {
        self.poll_interval_seconds = seconds;
        self
    }

    /// Sets the media output directory.
    #[must_use]
    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(dir.into());
        self
    }

    /// Gets the poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds)
    }
}

/// Configuration for the publish coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Prefix applied to the collection title.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

fn default_title_prefix() -> String {
    "Veo Story: ".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            title_prefix: default_title_prefix(),
        }
    }
}

impl PublishConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collection title prefix.
    #[must_use]
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert!(config.media_dir.is_none());
    }

    #[test]
    fn generator_builders() {
        let config = GeneratorConfig::new()
            .with_poll_interval(0.5)
            .with_media_dir("/tmp/media");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.media_dir, Some(PathBuf::from("/tmp/media")));
    }

    #[test]
    fn generator_deserializes_with_defaults() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.poll_interval_seconds, 10.0);
    }

    #[test]
    fn publish_defaults() {
        let config = PublishConfig::default();
        assert_eq!(config.title_prefix, "Veo Story: ");
    }
}
