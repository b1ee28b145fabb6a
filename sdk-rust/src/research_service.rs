use crate::{Language, ResearchResult, SearchResult};

/// A service that answers a research query with grounded sources.
#[async_trait::async_trait]
pub trait ResearchService: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    /// Answer `query` in `language`. Implementations must not return partial
    /// results: either a complete [`SearchResult`] or an error.
    async fn perform_research(&self, query: &str, language: Language)
        -> ResearchResult<SearchResult>;
}
