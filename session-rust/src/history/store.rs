use super::collection::{HistoryCollection, HistoryFeed, HistoryItem, NewHistoryItem};
use crate::{id_utils, identity::UserId};
use futures::Stream;
use scholar_sdk::{Language, SearchResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Handle to a live history feed for one identity.
///
/// The handle stops delivering once it is unsubscribed, either explicitly or
/// because the owning [`HistoryStore`] switched to another identity. After
/// that it reports an empty history.
#[derive(Clone)]
pub struct HistorySubscription {
    identity: UserId,
    feed: HistoryFeed,
    closed: watch::Receiver<bool>,
    close: Arc<watch::Sender<bool>>,
}

impl HistorySubscription {
    #[must_use]
    pub fn identity(&self) -> &UserId {
        &self.identity
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// The latest delivered history, newest first.
    #[must_use]
    pub fn current(&self) -> Vec<HistoryItem> {
        if self.is_closed() {
            return Vec::new();
        }
        self.feed.borrow().clone()
    }

    /// Wait for the next delivery. Returns `None` once the subscription is
    /// closed.
    pub async fn changed(&mut self) -> Option<Vec<HistoryItem>> {
        if self.is_closed() {
            return None;
        }

        let delivered = tokio::select! {
            biased;
            _ = self.closed.wait_for(|closed| *closed) => false,
            changed = self.feed.changed() => changed.is_ok(),
        };

        if !delivered || self.is_closed() {
            return None;
        }
        Some(self.feed.borrow_and_update().clone())
    }

    /// The current history followed by every later delivery, until the
    /// subscription is closed.
    pub fn into_stream(mut self) -> impl Stream<Item = Vec<HistoryItem>> + Send {
        async_stream::stream! {
            if !self.is_closed() {
                let items = self.feed.borrow_and_update().clone();
                yield items;
            }
            while let Some(items) = self.changed().await {
                yield items;
            }
        }
    }

    /// Tear the subscription down. Every clone of this handle stops
    /// delivering and the store that opened it falls back to an empty view.
    pub fn unsubscribe(self) {
        self.close();
    }

    fn close(&self) {
        self.close.send_replace(true);
    }
}

/// Identity-scoped view over a remote [`HistoryCollection`].
///
/// At most one subscription is active. Without an identity the view is empty
/// and every mutation is a no-op. Remote failures are logged and swallowed;
/// the feed stays the source of truth.
pub struct HistoryStore {
    collection: Arc<dyn HistoryCollection>,
    active: Mutex<Option<HistorySubscription>>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(collection: Arc<dyn HistoryCollection>) -> Self {
        Self {
            collection,
            active: Mutex::new(None),
        }
    }

    /// Subscribe to `identity`'s history, replacing the active subscription
    /// if it belongs to another identity.
    pub fn subscribe(&self, identity: &UserId) -> HistorySubscription {
        let mut active = self.active();
        if let Some(current) = active.as_ref() {
            if current.identity == *identity {
                return current.clone();
            }
        }
        if let Some(previous) = active.take() {
            tracing::debug!(user = %previous.identity, "closing history subscription");
            previous.close();
        }

        let (close, closed) = watch::channel(false);
        let subscription = HistorySubscription {
            identity: identity.clone(),
            feed: self.collection.watch(identity),
            closed,
            close: Arc::new(close),
        };
        tracing::debug!(user = %identity, "opened history subscription");
        *active = Some(subscription.clone());
        subscription
    }

    /// Follow an identity change: the previous subscription is closed before
    /// the new one opens, or before the view is cleared when `identity` is
    /// `None`.
    pub fn set_identity(&self, identity: Option<&UserId>) {
        match identity {
            Some(identity) => {
                self.subscribe(identity);
            }
            None => self.unsubscribe(),
        }
    }

    /// Close the active subscription, leaving an empty view.
    pub fn unsubscribe(&self) {
        if let Some(previous) = self.active().take() {
            tracing::debug!(user = %previous.identity, "closing history subscription");
            previous.close();
        }
    }

    #[must_use]
    pub fn active_identity(&self) -> Option<UserId> {
        self.active()
            .as_ref()
            .map(|active| active.identity.clone())
    }

    /// The current history of the active identity, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<HistoryItem> {
        self.active()
            .as_ref()
            .map(HistorySubscription::current)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<HistoryItem> {
        self.items().into_iter().find(|item| item.id == id)
    }

    /// Record a completed query for `identity`. Returns the new record id, or
    /// `None` when there is no identity or the write failed.
    pub async fn append(
        &self,
        identity: Option<&UserId>,
        query: &str,
        result: SearchResult,
        language: Language,
    ) -> Option<String> {
        let Some(owner) = identity else {
            tracing::debug!("no identity; history append skipped");
            return None;
        };

        let record = NewHistoryItem {
            query: query.to_string(),
            result,
            timestamp: id_utils::now_millis(),
            language,
        };

        match self.collection.create(owner, record).await {
            Ok(id) => {
                tracing::debug!(user = %owner, id = %id, "history item saved");
                Some(id)
            }
            Err(error) => {
                tracing::error!(%error, user = %owner, "error saving history");
                None
            }
        }
    }

    /// Remove one history record. Returns whether the store accepted the
    /// deletion.
    pub async fn delete_one(&self, identity: Option<&UserId>, id: &str) -> bool {
        let Some(owner) = identity else {
            return false;
        };

        match self.collection.delete(owner, id).await {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(%error, user = %owner, id = %id, "error deleting history item");
                false
            }
        }
    }

    /// Remove all of `items` in one atomic batch. Callers must have obtained
    /// the user's confirmation.
    pub async fn delete_all(&self, identity: Option<&UserId>, items: &[HistoryItem]) -> bool {
        let Some(owner) = identity else {
            return false;
        };
        if items.is_empty() {
            return true;
        }

        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        match self.collection.delete_many(owner, &ids).await {
            Ok(()) => {
                tracing::debug!(user = %owner, count = ids.len(), "history cleared");
                true
            }
            Err(error) => {
                tracing::error!(%error, user = %owner, "error clearing history");
                false
            }
        }
    }

    /// The active subscription, forgetting one that was unsubscribed through
    /// its handle.
    fn active(&self) -> MutexGuard<'_, Option<HistorySubscription>> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(HistorySubscription::is_closed) {
            *active = None;
        }
        active
    }
}

impl Drop for HistoryStore {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
