//! The five-stage generation state machine.
//!
//! A run drives the content provider through trend discovery, story
//! writing, concurrent image generation, and two sequential video segment
//! generations. Stages advance strictly in order; after every successful
//! stage the accumulated partial run is published through the progress
//! sink. Any failure aborts the run, resets the stage to idle, and
//! surfaces an error naming the failed stage. There is no retry and no
//! resume; a new run starts again from trend discovery.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::credentials::Session;
use crate::errors::{Result, StoryreelError};
use crate::pipeline::progress::{NoOpProgressSink, ProgressSink};
use crate::pipeline::{AspectRatio, ImagePrompts, PipelineRun, Stage, VideoArtifact};
use crate::providers::{ContentProvider, VideoRequest};

/// Drives one generation run at a time.
///
/// The pipeline itself does not guard against concurrent invocation; the
/// caller disables its trigger while a run is active.
pub struct GenerationPipeline {
    provider: Arc<dyn ContentProvider>,
    session: Arc<Session>,
    sink: Arc<dyn ProgressSink>,
    config: GeneratorConfig,
}

impl GenerationPipeline {
    /// Creates a pipeline with a no-op progress sink and default config.
    #[must_use]
    pub fn new(provider: Arc<dyn ContentProvider>, session: Arc<Session>) -> Self {
        Self {
            provider,
            session,
            sink: Arc::new(NoOpProgressSink),
            config: GeneratorConfig::default(),
        }
    }

    /// Sets the progress sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns a precondition error without any network call if no
    /// credential is selected. Any stage failure aborts the run with a
    /// [`StoryreelError::StageFailed`]; a credential-invalid failure also
    /// clears the session's credential-selected flag.
    pub async fn run(&self, aspect_ratio: AspectRatio) -> Result<PipelineRun> {
        if !self.session.credential_selected() {
            return Err(StoryreelError::precondition(
                "no credential selected, select an API key first",
            ));
        }

        match self.execute(aspect_ratio).await {
            Ok(run) => Ok(run),
            Err(err) => {
                if err.is_credential_invalid() {
                    warn!("provider rejected credential, clearing selection");
                    self.session.clear_credential();
                }
                // The busy signal must always clear on a failure path.
                self.sink.stage_changed(Stage::Idle);
                Err(err)
            }
        }
    }

    async fn execute(&self, aspect_ratio: AspectRatio) -> Result<PipelineRun> {
        let mut run = PipelineRun::new();
        info!(run_id = %run.run_id, aspect_ratio = %aspect_ratio, "generation run started");

        self.enter(&mut run, Stage::FindingTrend);
        let trend = self
            .provider
            .trend_topic()
            .await
            .map_err(|e| e.at_stage(Stage::FindingTrend))?;
        info!(run_id = %run.run_id, trend = %trend, "trend discovered");
        run.trend = Some(trend.clone());
        self.sink.partial(&run);

        self.enter(&mut run, Stage::WritingStory);
        let story = self
            .provider
            .story_for(&trend)
            .await
            .map_err(|e| e.at_stage(Stage::WritingStory))?;
        run.story = Some(story.clone());
        self.sink.partial(&run);

        self.enter(&mut run, Stage::GeneratingImages);
        let prompts = ImagePrompts::from_story(&story);
        // Fail-fast join: if any of the three rejects, the stage fails
        // immediately and no partial image set is surfaced.
        let (start, middle, end) = futures::try_join!(
            self.provider.generate_image(&prompts.start),
            self.provider.generate_image(&prompts.middle),
            self.provider.generate_image(&prompts.end),
        )
        .map_err(|e| e.at_stage(Stage::GeneratingImages))?;
        run.images = vec![start, middle, end];
        self.sink.partial(&run);

        self.enter(&mut run, Stage::GeneratingVideo1);
        let video1 = self
            .generate_segment(&run, 1, &story.part1, &run.images[0], &run.images[1], aspect_ratio)
            .await
            .map_err(|e| e.at_stage(Stage::GeneratingVideo1))?;
        run.videos.push(video1);
        self.sink.partial(&run);

        self.enter(&mut run, Stage::GeneratingVideo2);
        let video2 = self
            .generate_segment(&run, 2, &story.part2, &run.images[1], &run.images[2], aspect_ratio)
            .await
            .map_err(|e| e.at_stage(Stage::GeneratingVideo2))?;
        run.videos.push(video2);
        self.sink.partial(&run);

        self.enter(&mut run, Stage::Done);
        debug_assert!(run.ordering_holds());
        info!(run_id = %run.run_id, "generation run complete");
        Ok(run)
    }

    fn enter(&self, run: &mut PipelineRun, stage: Stage) {
        run.stage = stage;
        self.sink.stage_changed(stage);
    }

    /// Generates one video segment: submit, poll at a fixed interval until
    /// the provider reports done, then fetch the bytes.
    ///
    /// The poll loop has no attempt cap; it trusts the provider to
    /// eventually terminate the operation.
    async fn generate_segment(
        &self,
        run: &PipelineRun,
        part: usize,
        prompt: &str,
        start_image: &str,
        end_image: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<VideoArtifact> {
        let request = VideoRequest {
            prompt: prompt.to_string(),
            start_image: start_image.to_string(),
            end_image: end_image.to_string(),
            aspect_ratio,
        };

        let operation = self.provider.start_video(&request).await?;
        info!(run_id = %run.run_id, operation = %operation.name, part, "video operation submitted");

        let link = loop {
            let poll = self.provider.poll_video(&operation).await?;
            if poll.done {
                break poll.download_link.ok_or(StoryreelError::MissingDownloadLink)?;
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        };

        let bytes = self.provider.fetch_video(&link).await?;
        info!(run_id = %run.run_id, part, bytes = bytes.len(), "video segment downloaded");

        let mut artifact = VideoArtifact::new(bytes, link);
        if let Some(dir) = &self.config.media_dir {
            let file_name = format!("{}-part-{part}.mp4", run.run_id);
            artifact.save_to(dir, &file_name)?;
        }
        Ok(artifact)
    }
}
