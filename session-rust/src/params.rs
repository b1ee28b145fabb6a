use crate::{
    blob_store::{BlobStore, MemoryBlobStore},
    history::{HistoryCollection, InMemoryHistoryCollection},
    identity::{IdentityProvider, LocalIdentity},
};
use scholar_sdk::{Language, ResearchService};
use std::sync::Arc;

/// Parameters required to create a new research session.
/// # Default Values
/// - `blob_store`: `MemoryBlobStore`
/// - `history_collection`: `InMemoryHistoryCollection`
/// - `identity`: `LocalIdentity::anonymous()`
/// - `language`: `Language::En`
pub struct ResearchSessionParams {
    /// The research service queries are sent to.
    pub service: Arc<dyn ResearchService>,
    /// Local storage backing the saved citations.
    pub blob_store: Arc<dyn BlobStore>,
    /// Remote collection holding the per-identity history.
    pub history_collection: Arc<dyn HistoryCollection>,
    /// Source of the signed-in identity. History is only recorded while an
    /// identity is present.
    pub identity: Arc<dyn IdentityProvider>,
    /// Initial query language.
    pub language: Language,
}

impl ResearchSessionParams {
    pub fn new(service: Arc<dyn ResearchService>) -> Self {
        Self {
            service,
            blob_store: Arc::new(MemoryBlobStore::new()),
            history_collection: Arc::new(InMemoryHistoryCollection::new()),
            identity: Arc::new(LocalIdentity::anonymous()),
            language: Language::default(),
        }
    }

    /// Set the blob store for citations
    #[must_use]
    pub fn blob_store(mut self, blob_store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = blob_store;
        self
    }

    /// Set the remote history collection
    #[must_use]
    pub fn history_collection(mut self, history_collection: Arc<dyn HistoryCollection>) -> Self {
        self.history_collection = history_collection;
        self
    }

    /// Set the identity provider
    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Set the initial language
    #[must_use]
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
