//! Show schedule editor.
//!
//! A schedule is an ordered list of [`ScheduleGroup`]s, one per calendar day,
//! each holding the show times offered that day.
//!
//! # Invariants
//!
//! - At most one group per [`CalendarDate`]. The date picker hands over an
//!   instant; grouping always goes through [`CalendarDate::of`], so two
//!   instants on the same day coalesce into one group.
//! - A group's `times` are trimmed, non-empty, duplicate-free (exact match)
//!   and in insertion order.
//! - A group never exists with zero times: removing its last time removes
//!   the group.
//! - Groups stay in insertion order, not calendar order.

use crate::types::CalendarDate;
use chrono::{DateTime, FixedOffset};
use marquee_core::{effect::Effect, reducer::Reducer, SmallVec};
use marquee_macros::Action;
use serde::{Deserialize, Serialize};

/// One show date and the times offered on it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGroup {
    /// Calendar day of the shows
    pub date: CalendarDate,
    /// Show times, in insertion order
    pub times: Vec<String>,
}

impl ScheduleGroup {
    fn contains(&self, time: &str) -> bool {
        self.times.iter().any(|t| t == time)
    }
}

/// State of the schedule editor
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Date groups, in insertion order
    pub groups: Vec<ScheduleGroup>,
    /// Instant picked in the calendar, if any
    pub pending_date: Option<DateTime<FixedOffset>>,
    /// Text in the time input box, untrimmed
    pub pending_time: String,
}

impl ScheduleState {
    /// Creates an empty schedule
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: Vec::new(),
            pending_date: None,
            pending_time: String::new(),
        }
    }

    /// Whether no group exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Position of the group for `date`
    #[must_use]
    pub fn position(&self, date: CalendarDate) -> Option<usize> {
        self.groups.iter().position(|group| group.date == date)
    }

    /// The group for `date`
    #[must_use]
    pub fn group(&self, date: CalendarDate) -> Option<&ScheduleGroup> {
        self.position(date).map(|index| &self.groups[index])
    }

    /// Calendar day of the picked instant
    #[must_use]
    pub fn pending_day(&self) -> Option<CalendarDate> {
        self.pending_date.as_ref().map(CalendarDate::of)
    }

    /// Total number of show times across all groups
    #[must_use]
    pub fn show_count(&self) -> usize {
        self.groups.iter().map(|group| group.times.len()).sum()
    }
}

/// Actions for the schedule editor
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleAction {
    /// Pick a date in the calendar
    #[command]
    SelectDate {
        /// Instant reported by the picker
        at: DateTime<FixedOffset>,
    },

    /// Clear the picked date
    #[command]
    ClearDate,

    /// Replace the time input text verbatim
    #[command]
    SetPendingTime {
        /// New input text
        text: String,
    },

    /// Add the trimmed pending time under the picked date
    #[command]
    CommitTime,

    /// Remove a whole date group
    #[command]
    RemoveGroup {
        /// Position in `groups`
        group: usize,
    },

    /// Remove one time from a group, removing the group if it empties
    #[command]
    RemoveTime {
        /// Position in `groups`
        group: usize,
        /// Position in the group's `times`
        time: usize,
    },
}

/// Reducer for the schedule editor
#[derive(Clone, Debug, Default)]
pub struct ScheduleReducer;

impl ScheduleReducer {
    /// Creates a new `ScheduleReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn commit_time(state: &mut ScheduleState) {
        let Some(date) = state.pending_day() else {
            tracing::trace!("No date picked, ignoring show time");
            return;
        };

        let time = state.pending_time.trim();
        if time.is_empty() {
            tracing::trace!("Ignoring blank show time");
            return;
        }
        let time = time.to_string();

        match state.position(date) {
            Some(index) => {
                let group = &mut state.groups[index];
                if group.contains(&time) {
                    tracing::trace!(%date, %time, "Show time already scheduled");
                    return;
                }
                tracing::debug!(%date, %time, "Show time added");
                group.times.push(time);
            },
            None => {
                tracing::debug!(%date, %time, "Show date added");
                state.groups.push(ScheduleGroup {
                    date,
                    times: vec![time],
                });
            },
        }

        // The picked date stays so several times can be added in a row
        state.pending_time.clear();
    }

    fn remove_group(state: &mut ScheduleState, group: usize) {
        if group < state.groups.len() {
            let removed = state.groups.remove(group);
            tracing::debug!(date = %removed.date, times = removed.times.len(), "Show date removed");
        } else {
            tracing::trace!(group, len = state.groups.len(), "Group index out of range");
        }
    }

    fn remove_time(state: &mut ScheduleState, group: usize, time: usize) {
        let Some(target) = state.groups.get_mut(group) else {
            tracing::trace!(group, len = state.groups.len(), "Group index out of range");
            return;
        };

        if time >= target.times.len() {
            tracing::trace!(group, time, len = target.times.len(), "Time index out of range");
            return;
        }

        let removed = target.times.remove(time);
        tracing::debug!(date = %target.date, time = %removed, "Show time removed");

        if target.times.is_empty() {
            Self::remove_group(state, group);
        }
    }
}

impl Reducer for ScheduleReducer {
    type State = ScheduleState;
    type Action = ScheduleAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ScheduleAction::SelectDate { at } => state.pending_date = Some(at),
            ScheduleAction::ClearDate => state.pending_date = None,
            ScheduleAction::SetPendingTime { text } => state.pending_time = text,
            ScheduleAction::CommitTime => Self::commit_time(state),
            ScheduleAction::RemoveGroup { group } => Self::remove_group(state, group),
            ScheduleAction::RemoveTime { group, time } => Self::remove_time(state, group, time),
        }

        SmallVec::new()
    }
}
