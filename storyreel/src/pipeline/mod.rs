//! The generation pipeline: stage machine, run state, and progress sinks.

mod generator;
mod progress;
mod run;
mod stage;

#[cfg(test)]
mod integration_tests;

pub use generator::GenerationPipeline;
pub use progress::{
    CollectingProgressSink, LoggingProgressSink, NoOpProgressSink, ProgressSink,
};
pub use run::{AspectRatio, ImagePrompts, PipelineRun, Story, VideoArtifact};
pub use stage::Stage;
