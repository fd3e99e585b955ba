//! Cast roster editor.
//!
//! Keeps an ordered, duplicate-free list of cast member names plus the text
//! currently typed into the input box. Names are trimmed on commit and
//! compared case-sensitively; re-adding a name that is already listed is a
//! silent no-op.

use marquee_core::{effect::Effect, reducer::Reducer, SmallVec};
use marquee_macros::Action;
use serde::{Deserialize, Serialize};

/// State of the roster editor
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterState {
    /// Committed cast members, in insertion order
    pub entries: Vec<String>,
    /// Text in the input box, untrimmed
    pub draft: String,
}

impl RosterState {
    /// Creates an empty roster
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            draft: String::new(),
        }
    }

    /// Number of committed entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been committed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is already listed (exact match)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }
}

/// Actions for the roster editor
///
/// `CommitDraft` is sent both by the Add button and by the confirm keystroke
/// in the input box.
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterAction {
    /// Replace the draft text verbatim
    #[command]
    SetDraft {
        /// New input text
        text: String,
    },

    /// Commit the trimmed draft as a new entry
    #[command]
    CommitDraft,

    /// Remove the entry at `index`
    #[command]
    Remove {
        /// Position in `entries`
        index: usize,
    },
}

/// Reducer for the roster editor
#[derive(Clone, Debug, Default)]
pub struct RosterReducer;

impl RosterReducer {
    /// Creates a new `RosterReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn commit_draft(state: &mut RosterState) {
        let name = state.draft.trim();

        if name.is_empty() {
            tracing::trace!("Ignoring blank cast member");
            return;
        }

        if state.contains(name) {
            tracing::trace!(cast_member = name, "Cast member already listed");
            return;
        }

        let name = name.to_string();
        tracing::debug!(cast_member = %name, "Cast member added");
        state.entries.push(name);
        state.draft.clear();
    }
}

impl Reducer for RosterReducer {
    type State = RosterState;
    type Action = RosterAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RosterAction::SetDraft { text } => state.draft = text,

            RosterAction::CommitDraft => Self::commit_draft(state),

            RosterAction::Remove { index } => {
                if index < state.entries.len() {
                    let removed = state.entries.remove(index);
                    tracing::debug!(cast_member = %removed, "Cast member removed");
                } else {
                    tracing::trace!(index, len = state.entries.len(), "Remove index out of range");
                }
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_testing::{assertions, ReducerTest};

    fn add(name: &str) -> [RosterAction; 2] {
        [
            RosterAction::SetDraft {
                text: name.to_string(),
            },
            RosterAction::CommitDraft,
        ]
    }

    fn roster(entries: &[&str]) -> RosterState {
        RosterState {
            entries: entries.iter().map(ToString::to_string).collect(),
            draft: String::new(),
        }
    }

    #[test]
    fn set_draft_keeps_text_verbatim() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(RosterState::new())
            .when_action(RosterAction::SetDraft {
                text: "  Anna ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.draft, "  Anna ");
                assert!(state.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn commit_trims_appends_and_clears_draft() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(roster(&["Ben"]))
            .when_actions(add("  Anna  "))
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Ben", "Anna"]);
                assert!(state.draft.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn duplicate_is_silently_ignored() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(RosterState::new())
            .when_actions(add("Anna"))
            .when_actions(add("Anna"))
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Anna"]);
                // Suppressed commit leaves the draft in place
                assert_eq!(state.draft, "Anna");
            })
            .run();
    }

    #[test]
    fn duplicates_compare_case_sensitively() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(roster(&["Anna"]))
            .when_actions(add("anna"))
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Anna", "anna"]);
            })
            .run();
    }

    #[test]
    fn blank_draft_is_ignored() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(RosterState::new())
            .when_actions(add("   \t"))
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.draft, "   \t");
            })
            .run();
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(roster(&["Anna", "Ben", "Cleo"]))
            .when_action(RosterAction::Remove { index: 1 })
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Anna", "Cleo"]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(roster(&["Anna"]))
            .when_action(RosterAction::Remove { index: 1 })
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Anna"]);
            })
            .run();
    }

    #[test]
    fn removed_name_can_be_added_again() {
        ReducerTest::new(RosterReducer::new())
            .with_env(())
            .given_state(roster(&["Anna", "Ben"]))
            .when_action(RosterAction::Remove { index: 0 })
            .when_actions(add("Anna"))
            .then_state(|state| {
                assert_eq!(state.entries, vec!["Ben", "Anna"]);
            })
            .run();
    }
}
