use crate::history::HistoryItem;
use scholar_sdk::{Language, SearchResult};

/// Where the session is in the query lifecycle. Exactly one phase holds at a
/// time, so a result and an error can never be shown together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success(SearchResult),
    Failure(String),
}

/// Transient state of a research session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Text of the query input.
    pub query: String,
    /// Language used for the next query, or of the displayed result.
    pub language: Language,
    pub phase: Phase,
    /// Incremented whenever a new query is dispatched or the displayed
    /// content is replaced. Responses carrying an older generation are stale.
    pub generation: u64,
}

/// Everything that can change a [`SessionState`].
#[derive(Debug, Clone)]
pub enum SessionAction {
    QueryChanged(String),
    LanguageChanged(Language),
    Submitted {
        query: String,
        language: Language,
    },
    Succeeded {
        generation: u64,
        result: SearchResult,
    },
    Failed {
        generation: u64,
        message: String,
    },
    Reset,
    Restored(HistoryItem),
}

impl SessionState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    #[must_use]
    pub fn result(&self) -> Option<&SearchResult> {
        match &self.phase {
            Phase::Success(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failure(message) => Some(message),
            _ => None,
        }
    }

    /// Apply `action`. Returns whether the state changed; completions for a
    /// stale generation are ignored.
    pub fn reduce(&mut self, action: SessionAction) -> bool {
        match action {
            SessionAction::QueryChanged(query) => {
                if self.query == query {
                    return false;
                }
                self.query = query;
            }
            SessionAction::LanguageChanged(language) => {
                if self.language == language {
                    return false;
                }
                self.language = language;
            }
            SessionAction::Submitted { query, language } => {
                self.generation += 1;
                self.query = query;
                self.language = language;
                self.phase = Phase::Loading;
            }
            SessionAction::Succeeded { generation, result } => {
                if !self.accepts(generation) {
                    return false;
                }
                self.query.clear();
                self.phase = Phase::Success(result);
            }
            SessionAction::Failed { generation, message } => {
                if !self.accepts(generation) {
                    return false;
                }
                self.phase = Phase::Failure(message);
            }
            SessionAction::Reset => {
                self.generation += 1;
                self.query.clear();
                self.phase = Phase::Idle;
            }
            SessionAction::Restored(item) => {
                self.generation += 1;
                self.query = item.query;
                self.language = item.language;
                self.phase = Phase::Success(item.result);
            }
        }
        true
    }

    fn accepts(&self, generation: u64) -> bool {
        generation == self.generation && self.is_loading()
    }
}
