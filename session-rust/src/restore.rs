use crate::{history::HistoryItem, state::SessionAction, ResearchSession};
use scholar_sdk::Citation;

/// A source of the displayed result together with its bibliography status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceView {
    pub citation: Citation,
    /// Whether the citation is already in the bibliography, by id or uri.
    pub saved: bool,
}

impl ResearchSession {
    /// Display a past query and its stored result again without calling the
    /// research service. The history is left untouched and a query still in
    /// flight is discarded when it completes.
    pub fn restore(&self, item: HistoryItem) {
        tracing::debug!(id = %item.id, "restoring history item");
        self.dispatch(SessionAction::Restored(item));
    }

    /// Restore the history item with `id` from the current history view.
    /// Returns `false` if no such item is visible.
    pub fn restore_by_id(&self, id: &str) -> bool {
        match self.history().find(id) {
            Some(item) => {
                self.restore(item);
                true
            }
            None => false,
        }
    }

    /// The sources of the displayed result, each flagged with whether it is
    /// saved. Empty unless a result is displayed.
    #[must_use]
    pub fn source_views(&self) -> Vec<SourceView> {
        let state = self.state();
        let Some(result) = state.result() else {
            return Vec::new();
        };

        result
            .sources()
            .iter()
            .map(|citation| SourceView {
                saved: self.citations().is_saved(citation),
                citation: citation.clone(),
            })
            .collect()
    }
}
