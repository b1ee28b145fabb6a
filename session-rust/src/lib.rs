mod blob_store;
mod citation_store;
mod config;
mod errors;
pub mod history;
mod id_utils;
mod identity;
mod params;
mod restore;
mod session;
mod state;

pub use blob_store::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use citation_store::{CitationStore, CITATIONS_KEY};
pub use config::ScholarConfig;
pub use errors::{BoxedError, ConfigError, StoreError, StoreResult};
pub use history::{HistoryItem, HistoryStore, HistorySubscription};
pub use id_utils::generate_document_id;
pub use identity::{IdentityProvider, LocalIdentity, UserId};
pub use params::ResearchSessionParams;
pub use restore::SourceView;
pub use session::{
    ConfirmPrompt, ResearchSession, SubmitOutcome, CLEAR_HISTORY_PROMPT, GENERIC_FAILURE_MESSAGE,
};
pub use state::{Phase, SessionAction, SessionState};
