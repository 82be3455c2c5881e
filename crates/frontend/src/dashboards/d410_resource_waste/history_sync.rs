//! Keeps the address bar in step with the filter store.

use crate::shared::history::{HistoryMode, HistoryPatch, HistoryStore, LocationBackend, SearchDebounce};

use super::store::{FilterState, StoreChange};

/// How a store change reaches the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// New back/forward entry
    Push,
    Replace,
    /// Replace after the search quiet period
    Debounced,
    None,
}

pub fn history_action(change: StoreChange) -> HistoryAction {
    match change {
        StoreChange::Filters | StoreChange::Execution | StoreChange::Home => HistoryAction::Push,
        StoreChange::Table => HistoryAction::Replace,
        StoreChange::Search => HistoryAction::Debounced,
        StoreChange::Restore => HistoryAction::None,
    }
}

pub struct HistorySync<L: LocationBackend> {
    history: HistoryStore<L>,
    debounce: SearchDebounce,
}

impl<L: LocationBackend> HistorySync<L> {
    pub fn new(history: HistoryStore<L>) -> Self {
        Self {
            history,
            debounce: SearchDebounce::default(),
        }
    }

    pub fn history(&self) -> &HistoryStore<L> {
        &self.history
    }

    /// Writes the URL for `change` right away, or returns the ticket of a
    /// debounced write the caller must [`flush`](Self::flush) later.
    ///
    /// Every immediate write also cancels a pending debounced one; it already
    /// carries the newest search text.
    pub fn on_change(&self, state: &FilterState, change: StoreChange) -> Option<u64> {
        let mode = match history_action(change) {
            HistoryAction::Push => HistoryMode::Push,
            HistoryAction::Replace => HistoryMode::Replace,
            HistoryAction::Debounced => return Some(self.debounce.touch()),
            HistoryAction::None => {
                self.debounce.touch();
                return None;
            }
        };
        self.debounce.touch();
        self.history.push(HistoryPatch::full(state.to_query()), mode);
        None
    }

    /// Writes `state` if no newer change superseded `ticket`
    pub fn flush(&self, ticket: u64, state: &FilterState) -> bool {
        if !self.debounce.is_current(ticket) {
            return false;
        }
        self.history
            .push(HistoryPatch::full(state.to_query()), HistoryMode::Replace)
    }

    pub fn debounce(&self) -> &SearchDebounce {
        &self.debounce
    }
}
