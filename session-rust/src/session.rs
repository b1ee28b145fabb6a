use crate::{
    citation_store::CitationStore,
    history::{HistoryItem, HistoryStore},
    identity::{IdentityProvider, UserId},
    state::{SessionAction, SessionState},
    ResearchSessionParams,
};
use scholar_sdk::{Citation, Language, ResearchService, SearchResult};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::{sync::watch, task::JoinHandle};

/// Shown when a failed query carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Question asked before the whole history is deleted.
pub const CLEAR_HISTORY_PROMPT: &str = "Are you sure you want to clear your entire history?";

/// How a call to [`ResearchSession::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The query was blank. Nothing happened.
    Ignored,
    /// The result is displayed.
    Completed,
    /// The error message is displayed.
    Failed,
    /// A later submit, a reset or a restore replaced this query before it
    /// finished. Its response was discarded.
    Superseded,
}

/// Asks the user to confirm a destructive action.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Drives one research session: sends queries to the research service,
/// tracks the visible state, records completed queries in the history of the
/// signed-in identity and manages the saved citations.
pub struct ResearchSession {
    service: Arc<dyn ResearchService>,
    citations: Arc<CitationStore>,
    history: Arc<HistoryStore>,
    identity: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
    pending_appends: Mutex<Vec<JoinHandle<()>>>,
}

impl ResearchSession {
    #[must_use]
    pub fn new(params: ResearchSessionParams) -> Self {
        let session = Self {
            service: params.service,
            citations: Arc::new(CitationStore::load(params.blob_store)),
            history: Arc::new(HistoryStore::new(params.history_collection)),
            identity: params.identity,
            state: watch::Sender::new(SessionState {
                language: params.language,
                ..SessionState::default()
            }),
            pending_appends: Mutex::new(Vec::new()),
        };
        session.sync_identity();
        session
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state changes. The receiver starts at the current state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn citations(&self) -> &CitationStore {
        &self.citations
    }

    /// The history view, scoped to the identity signed in right now. Another
    /// identity's records are never visible through it.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        self.scoped_history().1
    }

    #[must_use]
    pub fn identity(&self) -> Option<UserId> {
        self.identity.current_identity()
    }

    pub(crate) fn dispatch(&self, action: SessionAction) -> bool {
        self.state.send_if_modified(|state| state.reduce(action))
    }

    /// Send `raw_query` to the research service and display the outcome.
    ///
    /// A blank query is ignored. On success the query is appended to the
    /// history of whoever is signed in at that moment; the append runs in the
    /// background and never affects the displayed result.
    pub async fn submit(&self, raw_query: &str, language: Language) -> SubmitOutcome {
        let query = raw_query.trim();
        if query.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let mut generation = 0;
        self.state.send_modify(|state| {
            state.reduce(SessionAction::Submitted {
                query: raw_query.to_string(),
                language,
            });
            generation = state.generation;
        });
        tracing::debug!(generation, language = %language, "research query submitted");

        match self.service.perform_research(query, language).await {
            Ok(result) => {
                let applied = self.dispatch(SessionAction::Succeeded {
                    generation,
                    result: result.clone(),
                });
                if !applied {
                    tracing::debug!(generation, "discarding superseded research result");
                    return SubmitOutcome::Superseded;
                }
                self.record_history(query, result, language);
                SubmitOutcome::Completed
            }
            Err(error) => {
                let mut message = error.to_string();
                if message.is_empty() {
                    message = GENERIC_FAILURE_MESSAGE.to_string();
                }
                if !self.dispatch(SessionAction::Failed {
                    generation,
                    message,
                }) {
                    tracing::debug!(generation, %error, "discarding superseded research failure");
                    return SubmitOutcome::Superseded;
                }
                tracing::debug!(generation, %error, "research query failed");
                SubmitOutcome::Failed
            }
        }
    }

    fn record_history(&self, query: &str, result: SearchResult, language: Language) {
        let Some(owner) = self.identity.current_identity() else {
            tracing::debug!("not signed in; result not recorded in history");
            return;
        };

        let history = Arc::clone(&self.history);
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            history.append(Some(&owner), &query, result, language).await;
        });

        let mut pending = self.lock_pending();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    /// Wait for every background history append started so far.
    pub async fn flush_history(&self) {
        let pending = std::mem::take(&mut *self.lock_pending());
        for handle in pending {
            if let Err(error) = handle.await {
                tracing::error!(%error, "history append task failed");
            }
        }
    }

    /// Return to the idle state. The language is kept. A query still in
    /// flight is discarded when it completes.
    pub fn reset(&self) {
        self.dispatch(SessionAction::Reset);
    }

    /// Replace the text of the query input without submitting it.
    pub fn set_query(&self, text: impl Into<String>) {
        self.dispatch(SessionAction::QueryChanged(text.into()));
    }

    pub fn set_language(&self, language: Language) {
        self.dispatch(SessionAction::LanguageChanged(language));
    }

    /// Add a source of the displayed result to the bibliography. Only
    /// possible while a result is displayed. Returns whether it was added.
    pub fn save_citation(&self, citation: Citation) -> bool {
        if self.state.borrow().result().is_none() {
            return false;
        }
        self.citations.save(citation)
    }

    pub fn remove_citation(&self, id: &str) -> bool {
        self.citations.remove(id)
    }

    pub fn clear_citations(&self) {
        self.citations.clear();
    }

    /// Point the history view at the identity currently signed in.
    pub fn sync_identity(&self) {
        self.scoped_history();
    }

    fn scoped_history(&self) -> (Option<UserId>, &HistoryStore) {
        let identity = self.identity.current_identity();
        if self.history.active_identity() != identity {
            self.history.set_identity(identity.as_ref());
        }
        (identity, &self.history)
    }

    /// Follow `changes` until the sender goes away or the session is dropped,
    /// re-scoping the history view on every identity change.
    #[must_use]
    pub fn track_identity(
        self: &Arc<Self>,
        mut changes: watch::Receiver<Option<UserId>>,
    ) -> JoinHandle<()> {
        let session: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let identity = changes.borrow_and_update().clone();
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.history.set_identity(identity.as_ref());
            }
        })
    }

    /// Sign out and clear the history view.
    pub fn sign_out(&self) {
        self.identity.sign_out();
        self.history.set_identity(None);
    }

    /// Delete one entry from the signed-in identity's history.
    pub async fn delete_history_item(&self, id: &str) -> bool {
        let (identity, history) = self.scoped_history();
        history.delete_one(identity.as_ref(), id).await
    }

    /// Delete the whole visible history after the user confirms
    /// [`CLEAR_HISTORY_PROMPT`]. Returns whether anything was deleted.
    pub async fn clear_history(&self, confirm: impl ConfirmPrompt) -> bool {
        let (Some(identity), history) = self.scoped_history() else {
            return false;
        };
        let items: Vec<HistoryItem> = history.items();
        if items.is_empty() {
            return false;
        }
        if !confirm.confirm(CLEAR_HISTORY_PROMPT) {
            tracing::debug!("clearing history was not confirmed");
            return false;
        }
        history.delete_all(Some(&identity), &items).await
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending_appends
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
