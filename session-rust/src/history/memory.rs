use super::collection::{sort_newest_first, HistoryCollection, HistoryFeed, HistoryItem, NewHistoryItem};
use crate::{id_utils, identity::UserId, StoreError, StoreResult};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};
use tokio::sync::watch;

struct OwnerHistory {
    /// Always sorted newest first.
    records: Vec<HistoryItem>,
    feed: watch::Sender<Vec<HistoryItem>>,
}

impl OwnerHistory {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            feed: watch::Sender::new(Vec::new()),
        }
    }

    fn publish(&self) {
        self.feed.send_replace(self.records.clone());
    }
}

/// History collection held in process memory, partitioned by owner.
///
/// Each committed write publishes exactly one new snapshot to the owner's
/// feed, after the write is complete.
#[derive(Default)]
pub struct InMemoryHistoryCollection {
    owners: Mutex<HashMap<UserId, OwnerHistory>>,
    offline: AtomicBool,
}

impl InMemoryHistoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection to the store. While offline every
    /// write fails with [`StoreError::Unavailable`] and nothing is applied.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of records stored for `owner`.
    #[must_use]
    pub fn len(&self, owner: &UserId) -> usize {
        self.lock()
            .get(owner)
            .map_or(0, |history| history.records.len())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, OwnerHistory>> {
        self.owners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("history store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HistoryCollection for InMemoryHistoryCollection {
    async fn create(&self, owner: &UserId, record: NewHistoryItem) -> StoreResult<String> {
        self.ensure_online()?;

        let id = id_utils::generate_document_id();
        let mut owners = self.lock();
        let history = owners.entry(owner.clone()).or_insert_with(OwnerHistory::new);
        history.records.push(record.into_item(id.clone()));
        sort_newest_first(&mut history.records);
        history.publish();

        Ok(id)
    }

    async fn delete(&self, owner: &UserId, id: &str) -> StoreResult<()> {
        self.ensure_online()?;

        let mut owners = self.lock();
        if let Some(history) = owners.get_mut(owner) {
            let before = history.records.len();
            history.records.retain(|item| item.id != id);
            if history.records.len() != before {
                history.publish();
            }
        }

        Ok(())
    }

    async fn delete_many(&self, owner: &UserId, ids: &[String]) -> StoreResult<()> {
        self.ensure_online()?;

        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut owners = self.lock();
        if let Some(history) = owners.get_mut(owner) {
            let before = history.records.len();
            history.records.retain(|item| !ids.contains(item.id.as_str()));
            if history.records.len() != before {
                history.publish();
            }
        }

        Ok(())
    }

    fn watch(&self, owner: &UserId) -> HistoryFeed {
        let mut owners = self.lock();
        owners
            .entry(owner.clone())
            .or_insert_with(OwnerHistory::new)
            .feed
            .subscribe()
    }
}
