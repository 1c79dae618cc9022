//! Progress sinks for the generation pipeline.
//!
//! The pipeline reports every stage transition and, after each successful
//! stage, a snapshot of the accumulated partial run so the presentation
//! layer can render incrementally.

use tracing::info;

use crate::pipeline::{PipelineRun, Stage};

/// Receives stage transitions and partial-run snapshots.
pub trait ProgressSink: Send + Sync {
    /// Called when the pipeline enters a stage (including the reset to
    /// `Idle` on failure).
    fn stage_changed(&self, stage: Stage);

    /// Called with the accumulated run after each successful stage.
    fn partial(&self, run: &PipelineRun);
}

/// A sink that discards all progress.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn stage_changed(&self, _stage: Stage) {}
    fn partial(&self, _run: &PipelineRun) {}
}

/// A sink that logs progress through the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProgressSink;

impl ProgressSink for LoggingProgressSink {
    fn stage_changed(&self, stage: Stage) {
        info!(stage = %stage, "pipeline stage changed");
    }

    fn partial(&self, run: &PipelineRun) {
        info!(
            run_id = %run.run_id,
            stage = %run.stage,
            images = run.images.len(),
            videos = run.videos.len(),
            "pipeline partial result"
        );
    }
}

/// A sink that records everything it receives, for tests.
#[derive(Debug, Default)]
pub struct CollectingProgressSink {
    stages: parking_lot::Mutex<Vec<Stage>>,
    snapshots: parking_lot::Mutex<Vec<PipelineRun>>,
}

impl CollectingProgressSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stage transitions in order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().clone()
    }

    /// Returns the partial-run snapshots in order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<PipelineRun> {
        self.snapshots.lock().clone()
    }

    /// Returns the last stage seen, if any.
    #[must_use]
    pub fn last_stage(&self) -> Option<Stage> {
        self.stages.lock().last().copied()
    }
}

impl ProgressSink for CollectingProgressSink {
    fn stage_changed(&self, stage: Stage) {
        self.stages.lock().push(stage);
    }

    fn partial(&self, run: &PipelineRun) {
        self.snapshots.lock().push(run.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_records_in_order() {
        let sink = CollectingProgressSink::new();
        sink.stage_changed(Stage::FindingTrend);
        sink.stage_changed(Stage::WritingStory);
        sink.partial(&PipelineRun::new());

        assert_eq!(sink.stages(), vec![Stage::FindingTrend, Stage::WritingStory]);
        assert_eq!(sink.last_stage(), Some(Stage::WritingStory));
        assert_eq!(sink.snapshots().len(), 1);
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let sink = NoOpProgressSink;
        sink.stage_changed(Stage::Done);
        sink.partial(&PipelineRun::new());
    }
}
