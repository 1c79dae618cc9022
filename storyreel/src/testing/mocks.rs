//! Mock providers that record calls and return scripted responses.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::errors::{Result, StoryreelError};
use crate::pipeline::Story;
use crate::providers::{
    ContentProvider, PublishingProvider, VideoOperation, VideoPoll, VideoRequest,
};

/// A scripted content provider.
///
/// Every call is counted. Failures are injected per operation as raw
/// provider messages, so credential-invalid classification flows through
/// the same path as the real providers.
#[derive(Debug, Default)]
pub struct MockContent {
    trend: Mutex<Option<String>>,
    trend_failure: Mutex<Option<String>>,
    story: Mutex<Option<Story>>,
    story_schema_failure: Mutex<bool>,
    image_failures: Mutex<Vec<(usize, String)>>,
    polls: Mutex<VecDeque<VideoPoll>>,
    video_bytes: Mutex<Vec<u8>>,
    trend_calls: Mutex<usize>,
    story_calls: Mutex<usize>,
    image_calls: Mutex<usize>,
    start_video_calls: Mutex<usize>,
    poll_calls: Mutex<usize>,
    fetch_calls: Mutex<usize>,
    video_requests: Mutex<Vec<VideoRequest>>,
}

impl MockContent {
    /// A provider where every stage succeeds with canned content.
    #[must_use]
    pub fn happy_path() -> Self {
        let mock = Self::default();
        *mock.trend.lock() = Some("midnight market tours".to_string());
        *mock.story.lock() = Some(Story {
            title: "The Midnight Market".to_string(),
            part1: "A market appears only at midnight.".to_string(),
            part2: "Its vendors turn out to be ghosts.".to_string(),
        });
        *mock.video_bytes.lock() = vec![0xDE, 0xAD, 0xBE, 0xEF];
        mock
    }

    /// Fails trend discovery with the given provider message.
    pub fn fail_trend(&self, message: impl Into<String>) {
        *self.trend_failure.lock() = Some(message.into());
    }

    /// Makes the story response fail schema validation.
    pub fn fail_story_schema(&self) {
        *self.story_schema_failure.lock() = true;
    }

    /// Fails the image call at `index` (0-based, in call order).
    pub fn fail_image(&self, index: usize, message: impl Into<String>) {
        self.image_failures.lock().push((index, message.into()));
    }

    /// Scripts the poll responses, consumed in order across all
    /// operations. Once exhausted, polls report done with a default link.
    pub fn script_polls(&self, polls: Vec<VideoPoll>) {
        *self.polls.lock() = polls.into();
    }

    /// Number of trend discovery calls.
    #[must_use]
    pub fn trend_calls(&self) -> usize {
        *self.trend_calls.lock()
    }

    /// Number of image generation calls.
    #[must_use]
    pub fn image_calls(&self) -> usize {
        *self.image_calls.lock()
    }

    /// Number of video submissions.
    #[must_use]
    pub fn start_video_calls(&self) -> usize {
        *self.start_video_calls.lock()
    }

    /// Number of poll calls.
    #[must_use]
    pub fn poll_calls(&self) -> usize {
        *self.poll_calls.lock()
    }

    /// Number of download fetches.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock()
    }

    /// The video requests submitted, in order.
    #[must_use]
    pub fn video_requests(&self) -> Vec<VideoRequest> {
        self.video_requests.lock().clone()
    }
}

#[async_trait]
impl ContentProvider for MockContent {
    async fn trend_topic(&self) -> Result<String> {
        *self.trend_calls.lock() += 1;
        if let Some(message) = self.trend_failure.lock().clone() {
            return Err(StoryreelError::provider(message));
        }
        self.trend
            .lock()
            .clone()
            .ok_or_else(|| StoryreelError::provider("no trend scripted"))
    }

    async fn story_for(&self, _topic: &str) -> Result<Story> {
        *self.story_calls.lock() += 1;
        if *self.story_schema_failure.lock() {
            return Err(StoryreelError::InvalidStory(
                "missing required field `part2`".to_string(),
            ));
        }
        self.story
            .lock()
            .clone()
            .ok_or_else(|| StoryreelError::provider("no story scripted"))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let index = {
            let mut calls = self.image_calls.lock();
            let index = *calls;
            *calls += 1;
            index
        };
        if let Some((_, message)) = self
            .image_failures
            .lock()
            .iter()
            .find(|(i, _)| *i == index)
            .cloned()
        {
            return Err(StoryreelError::provider(message));
        }
        Ok(format!("img-{index}:{}", prompt.len()))
    }

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation> {
        *self.start_video_calls.lock() += 1;
        self.video_requests.lock().push(request.clone());
        let id = *self.start_video_calls.lock();
        Ok(VideoOperation::new(format!("operations/mock-{id}")))
    }

    async fn poll_video(&self, _operation: &VideoOperation) -> Result<VideoPoll> {
        *self.poll_calls.lock() += 1;
        Ok(self
            .polls
            .lock()
            .pop_front()
            .unwrap_or_else(|| VideoPoll::done_with_link("https://cdn.example/video.mp4")))
    }

    async fn fetch_video(&self, _download_link: &str) -> Result<Vec<u8>> {
        *self.fetch_calls.lock() += 1;
        Ok(self.video_bytes.lock().clone())
    }
}

/// A recorded upload on the mock publisher.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// The item title.
    pub title: String,
    /// The item description.
    pub description: String,
    /// Size of the uploaded payload.
    pub byte_len: usize,
}

/// A scripted publishing provider.
#[derive(Debug)]
pub struct MockPublisher {
    collection_id: String,
    create_failure: Mutex<Option<String>>,
    upload_failures: Mutex<VecDeque<Option<String>>>,
    attach_failures: Mutex<VecDeque<Option<String>>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    attached: Mutex<Vec<(String, String)>>,
    next_item: Mutex<usize>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self {
            collection_id: "PL-mock-collection".to_string(),
            create_failure: Mutex::new(None),
            upload_failures: Mutex::new(VecDeque::new()),
            attach_failures: Mutex::new(VecDeque::new()),
            uploads: Mutex::new(Vec::new()),
            attached: Mutex::new(Vec::new()),
            next_item: Mutex::new(0),
        }
    }
}

impl MockPublisher {
    /// A publisher where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails collection creation.
    pub fn fail_create(&self, message: impl Into<String>) {
        *self.create_failure.lock() = Some(message.into());
    }

    /// Scripts upload outcomes in call order; `None` succeeds.
    pub fn script_uploads(&self, outcomes: Vec<Option<String>>) {
        *self.upload_failures.lock() = outcomes.into();
    }

    /// Scripts attach outcomes in call order; `None` succeeds.
    pub fn script_attaches(&self, outcomes: Vec<Option<String>>) {
        *self.attach_failures.lock() = outcomes.into();
    }

    /// The uploads that reached the provider, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().clone()
    }

    /// The (collection, item) pairs successfully attached, in order.
    #[must_use]
    pub fn attached(&self) -> Vec<(String, String)> {
        self.attached.lock().clone()
    }
}

#[async_trait]
impl PublishingProvider for MockPublisher {
    async fn create_collection(
        &self,
        _access_token: &str,
        _title: &str,
        _description: &str,
    ) -> Result<String> {
        if let Some(message) = self.create_failure.lock().clone() {
            return Err(StoryreelError::provider(message));
        }
        Ok(self.collection_id.clone())
    }

    async fn upload_item(
        &self,
        _access_token: &str,
        bytes: Vec<u8>,
        title: &str,
        description: &str,
    ) -> Result<String> {
        if let Some(Some(message)) = self.upload_failures.lock().pop_front() {
            return Err(StoryreelError::provider(message));
        }
        self.uploads.lock().push(RecordedUpload {
            title: title.to_string(),
            description: description.to_string(),
            byte_len: bytes.len(),
        });
        let mut next = self.next_item.lock();
        *next += 1;
        Ok(format!("vid-{next}", next = *next))
    }

    async fn attach_item(
        &self,
        _access_token: &str,
        collection_id: &str,
        item_id: &str,
    ) -> Result<()> {
        if let Some(Some(message)) = self.attach_failures.lock().pop_front() {
            return Err(StoryreelError::provider(message));
        }
        self.attached
            .lock()
            .push((collection_id.to_string(), item_id.to_string()));
        Ok(())
    }
}
