use std::{collections::VecDeque, sync::Mutex};

use futures::channel::oneshot;

use crate::{
    errors::{ResearchError, ResearchResult},
    research_service::ResearchService,
    Language, SearchResult,
};

/// Result for a mocked `perform_research` call.
/// It can either be a full result, an error, or a deferred outcome that is
/// resolved later by the test through the paired sender.
pub enum MockResearchResult {
    Response(SearchResult),
    Error(ResearchError),
    Deferred(oneshot::Receiver<ResearchResult<SearchResult>>),
}

impl MockResearchResult {
    /// Construct a result that yields the provided search result.
    pub fn response(result: SearchResult) -> Self {
        Self::Response(result)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: ResearchError) -> Self {
        Self::Error(error)
    }

    /// Construct a result that resolves only once the returned sender is
    /// used. Dropping the sender resolves the call with an error.
    pub fn deferred() -> (Self, oneshot::Sender<ResearchResult<SearchResult>>) {
        let (sender, receiver) = oneshot::channel();
        (Self::Deferred(receiver), sender)
    }
}

impl From<SearchResult> for MockResearchResult {
    fn from(result: SearchResult) -> Self {
        Self::response(result)
    }
}

impl From<ResearchResult<SearchResult>> for MockResearchResult {
    fn from(result: ResearchResult<SearchResult>) -> Self {
        match result {
            Ok(result) => Self::Response(result),
            Err(error) => Self::Error(error),
        }
    }
}

/// An input received by the mock service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResearchCall {
    pub query: String,
    pub language: Language,
}

#[derive(Default)]
struct MockResearchServiceState {
    mocked_results: VecDeque<MockResearchResult>,
    tracked_calls: Vec<MockResearchCall>,
}

impl MockResearchServiceState {
    fn enqueue_result(&mut self, result: MockResearchResult) {
        self.mocked_results.push_back(result);
    }

    fn reset(&mut self) {
        self.tracked_calls.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }
}

/// A mock research service for testing that tracks inputs and yields
/// predefined outputs.
pub struct MockResearchService {
    provider: &'static str,
    model_id: String,
    state: Mutex<MockResearchServiceState>,
}

impl Default for MockResearchService {
    fn default() -> Self {
        Self {
            provider: "mock",
            model_id: "mock-model".to_string(),
            state: Mutex::new(MockResearchServiceState::default()),
        }
    }
}

impl MockResearchService {
    /// Construct a new mock research service instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the provider identifier returned by the mock.
    pub fn set_provider(&mut self, provider: &'static str) {
        self.provider = provider;
    }

    /// Override the model identifier returned by the mock.
    pub fn set_model_id<S: Into<String>>(&mut self, model_id: S) {
        self.model_id = model_id.into();
    }

    /// Enqueue one or more mocked results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockResearchResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        for result in results {
            state.enqueue_result(result);
        }
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResearchResult>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Retrieve the tracked calls accumulated so far.
    pub fn tracked_calls(&self) -> Vec<MockResearchCall> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_calls.clone()
    }

    /// Reset tracked calls without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked calls and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl ResearchService for MockResearchService {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn perform_research(
        &self,
        query: &str,
        language: Language,
    ) -> ResearchResult<SearchResult> {
        let result = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_calls.push(MockResearchCall {
                query: query.to_string(),
                language,
            });

            state.mocked_results.pop_front().ok_or_else(|| {
                ResearchError::Invariant(self.provider, "no mocked results available".into())
            })?
        };

        match result {
            MockResearchResult::Response(result) => Ok(result),
            MockResearchResult::Error(error) => Err(error),
            MockResearchResult::Deferred(receiver) => receiver.await.unwrap_or_else(|_| {
                Err(ResearchError::Invariant(
                    self.provider,
                    "deferred result was dropped".into(),
                ))
            }),
        }
    }
}
