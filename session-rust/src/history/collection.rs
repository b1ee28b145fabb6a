use crate::{identity::UserId, StoreResult};
use scholar_sdk::{Language, SearchResult};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A persisted research query and the result it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    /// Assigned by the store.
    pub id: String,
    pub query: String,
    /// Snapshot of the result at the time of the query.
    pub result: SearchResult,
    /// Milliseconds since the Unix epoch, supplied by the client.
    pub timestamp: i64,
    pub language: Language,
}

/// A history record as sent to the store, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewHistoryItem {
    pub query: String,
    pub result: SearchResult,
    pub timestamp: i64,
    pub language: Language,
}

impl NewHistoryItem {
    #[must_use]
    pub fn into_item(self, id: impl Into<String>) -> HistoryItem {
        HistoryItem {
            id: id.into(),
            query: self.query,
            result: self.result,
            timestamp: self.timestamp,
            language: self.language,
        }
    }
}

/// Live view of one owner's history, newest first. Every change re-delivers
/// the whole sequence.
pub type HistoryFeed = watch::Receiver<Vec<HistoryItem>>;

/// A remote, per-owner ordered collection of history records.
#[async_trait::async_trait]
pub trait HistoryCollection: Send + Sync {
    /// Store a record and return its assigned id.
    async fn create(&self, owner: &UserId, record: NewHistoryItem) -> StoreResult<String>;
    /// Remove one record. Removing an unknown id is not an error.
    async fn delete(&self, owner: &UserId, id: &str) -> StoreResult<()>;
    /// Remove every listed record in a single atomic batch. Observers of the
    /// feed never see a state where only some of them are gone.
    async fn delete_many(&self, owner: &UserId, ids: &[String]) -> StoreResult<()>;
    /// Open a live feed of the owner's records sorted by `timestamp`
    /// descending.
    fn watch(&self, owner: &UserId) -> HistoryFeed;
}

/// Sort by `timestamp` descending. The sort is stable, so equal timestamps
/// keep their relative order.
pub fn sort_newest_first(items: &mut [HistoryItem]) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
