//! End-to-end tests over the mock providers: a full generation run
//! followed by a publish, and the credential-recovery path across the
//! two entry points.

use std::sync::Arc;

use crate::config::{GeneratorConfig, PublishConfig};
use crate::credentials::{Session, StaticTokenProvider};
use crate::history::{MemoryStorage, PublishHistory, StorageBackend};
use crate::pipeline::{
    AspectRatio, CollectingProgressSink, GenerationPipeline, ProgressSink, Stage,
};
use crate::publish::PublishCoordinator;
use crate::testing::{MockContent, MockPublisher};

struct Harness {
    content: Arc<MockContent>,
    publisher: Arc<MockPublisher>,
    session: Arc<Session>,
    sink: Arc<CollectingProgressSink>,
    pipeline: GenerationPipeline,
    coordinator: PublishCoordinator,
    history: Arc<PublishHistory>,
}

fn harness() -> Harness {
    let content = Arc::new(MockContent::happy_path());
    let publisher = Arc::new(MockPublisher::new());
    let session = Arc::new(Session::new());
    session.select_credential();
    let sink = Arc::new(CollectingProgressSink::new());
    let history = Arc::new(PublishHistory::load(
        Arc::new(MemoryStorage::new()) as Arc<dyn StorageBackend>
    ));

    let pipeline = GenerationPipeline::new(Arc::clone(&content) as _, Arc::clone(&session))
        .with_sink(Arc::clone(&sink) as Arc<dyn ProgressSink>)
        .with_config(GeneratorConfig::new().with_poll_interval(0.001));
    let coordinator = PublishCoordinator::new(
        Arc::clone(&publisher) as _,
        Arc::new(StaticTokenProvider::with_token("tok")),
        Arc::clone(&history),
    )
    .with_config(PublishConfig::new());

    Harness {
        content,
        publisher,
        session,
        sink,
        pipeline,
        coordinator,
        history,
    }
}

#[tokio::test]
async fn generate_then_publish_end_to_end() {
    let h = harness();

    let run = h.pipeline.run(AspectRatio::Landscape).await.unwrap();
    assert_eq!(run.stage, Stage::Done);
    assert!(run.is_complete());
    assert!(run.ordering_holds());

    // Segment seeding: part 1 bridges images 0-1, part 2 bridges 1-2.
    let requests = h.content.video_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].start_image, run.images[0]);
    assert_eq!(requests[0].end_image, run.images[1]);
    assert_eq!(requests[1].start_image, run.images[1]);
    assert_eq!(requests[1].end_image, run.images[2]);

    let outcome = h.coordinator.publish(&run).await.unwrap();
    assert!(outcome.is_fully_attached());

    let records = h.history.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].collection_id, outcome.collection_id);
    assert_eq!(
        records[0].playlist_url(),
        format!(
            "https://www.youtube.com/playlist?list={}",
            outcome.collection_id
        )
    );
}

#[tokio::test]
async fn run_failure_does_not_leak_into_publish_preconditions() {
    let h = harness();
    h.content.fail_image(2, "image backend down");

    let err = h.pipeline.run(AspectRatio::Portrait).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::GeneratingImages));
    assert_eq!(h.sink.last_stage(), Some(Stage::Idle));

    // The only visible run state is the failed sink snapshots; publishing
    // any of them is rejected before a network call.
    for snapshot in h.sink.snapshots() {
        let err = h.coordinator.publish(&snapshot).await.unwrap_err();
        assert!(err.is_precondition());
    }
    assert!(h.publisher.uploads().is_empty());
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn credential_recovery_requires_reselection() {
    let h = harness();
    h.content.fail_trend("Requested entity was not found.");

    assert!(h.pipeline.run(AspectRatio::Landscape).await.is_err());
    assert!(!h.session.credential_selected());

    // Re-selecting restores the pipeline; the mock keeps failing until the
    // script is cleared, so clear it by rebuilding a healthy provider.
    h.session.select_credential();
    let content = Arc::new(MockContent::happy_path());
    let pipeline = GenerationPipeline::new(content, Arc::clone(&h.session))
        .with_config(GeneratorConfig::new().with_poll_interval(0.001));
    let run = pipeline.run(AspectRatio::Landscape).await.unwrap();
    assert!(run.is_complete());
}
