use crate::{blob_store::BlobStore, StoreError};
use scholar_sdk::{dedupe_by_uri, Citation};
use std::sync::{Arc, PoisonError, RwLock};

/// Key of the citation snapshot in the blob store.
pub const CITATIONS_KEY: &str = "scholar_citations";

/// The user's bibliography: saved citations, unique by `uri`, in the order
/// they were saved.
///
/// Every mutation writes the full snapshot through to the blob store.
/// Persistence failures are logged and never reach the caller.
pub struct CitationStore {
    blob_store: Arc<dyn BlobStore>,
    citations: RwLock<Vec<Citation>>,
}

impl CitationStore {
    /// Rehydrate the store from its persisted snapshot. A missing or
    /// unreadable snapshot yields an empty store.
    pub fn load(blob_store: Arc<dyn BlobStore>) -> Self {
        let citations = match blob_store.get(CITATIONS_KEY) {
            Ok(Some(snapshot)) => match serde_json::from_str::<Vec<Citation>>(&snapshot) {
                Ok(citations) => dedupe_by_uri(citations),
                Err(error) => {
                    tracing::warn!(%error, "citation snapshot is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "citation snapshot could not be read; starting empty");
                Vec::new()
            }
        };

        tracing::debug!(count = citations.len(), "citation store loaded");

        Self {
            blob_store,
            citations: RwLock::new(citations),
        }
    }

    /// Insert `citation` unless a citation with the same `uri` is already
    /// saved. Returns whether it was inserted.
    pub fn save(&self, citation: Citation) -> bool {
        let mut citations = self.citations.write().unwrap_or_else(PoisonError::into_inner);
        if citations.iter().any(|saved| saved.uri == citation.uri) {
            return false;
        }
        citations.push(citation);
        self.persist(&citations);
        true
    }

    /// Remove the citation with `id`. Returns whether one was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut citations = self.citations.write().unwrap_or_else(PoisonError::into_inner);
        let before = citations.len();
        citations.retain(|saved| saved.id != id);
        if citations.len() == before {
            return false;
        }
        self.persist(&citations);
        true
    }

    pub fn clear(&self) {
        let mut citations = self.citations.write().unwrap_or_else(PoisonError::into_inner);
        citations.clear();
        self.persist(&citations);
    }

    /// Whether `candidate` is already saved, matching by `id` or by `uri`.
    ///
    /// Sources from a fresh research run carry new ids, so the `uri` check
    /// is what recognizes a previously saved source.
    pub fn is_saved(&self, candidate: &Citation) -> bool {
        let citations = self.citations.read().unwrap_or_else(PoisonError::into_inner);
        citations
            .iter()
            .any(|saved| saved.id == candidate.id || saved.uri == candidate.uri)
    }

    #[must_use]
    pub fn citations(&self) -> Vec<Citation> {
        self.citations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.citations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, citations: &[Citation]) {
        let result = serde_json::to_string(citations)
            .map_err(StoreError::from)
            .and_then(|snapshot| self.blob_store.set(CITATIONS_KEY, &snapshot));

        if let Err(error) = result {
            tracing::warn!(%error, "failed to persist citations");
        }
    }
}
