//! Movie entry form.
//!
//! Composes the scalar [`MovieFields`] with the cast [`roster`](crate::roster)
//! and show [`schedule`](crate::schedule) editors and gates submission:
//!
//! 1. every field must validate, otherwise per-field errors are shown
//! 2. the roster must not be empty
//! 3. the schedule must not be empty
//!
//! Only then is a [`MoviePayload`] assembled and handed to the
//! [`SubmissionSink`]. On success the whole form resets; on failure it is
//! left untouched for a retry.
//!
//! While a submission is in flight the form is frozen: further edits are
//! queued in arrival order and replayed once the outcome is known, and a
//! second `Submit` is ignored.

use crate::error::SubmitError;
use crate::fields::{validate_rating, FieldErrors, MovieField, MovieFields};
use crate::payload::MoviePayload;
use crate::roster::{RosterAction, RosterReducer, RosterState};
use crate::schedule::{ScheduleAction, ScheduleReducer, ScheduleState};
use crate::sink::{SubmissionError, SubmissionReceipt, SubmissionSink};
use chrono::{DateTime, Utc};
use marquee_core::composition::{scope_reducer, ScopedReducer};
use marquee_core::{effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec};
use marquee_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the latest submission stands
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Nothing submitted, or the last outcome was dismissed
    #[default]
    Idle,
    /// Payload is with the sink
    InFlight,
    /// Catalog accepted the movie
    Succeeded {
        /// Identifier assigned by the catalog
        movie_id: Option<String>,
        /// When the acknowledgement arrived
        at: DateTime<Utc>,
    },
    /// Catalog did not accept the movie
    Failed {
        /// Reason to show the user
        reason: SubmitError,
    },
}

impl SubmissionStatus {
    /// Whether the form is busy
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// State of the movie entry form
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFormState {
    /// Scalar fields
    pub fields: MovieFields,
    /// Cast editor
    pub roster: RosterState,
    /// Show schedule editor
    pub schedule: ScheduleState,
    /// Per-field errors from the last submit attempt
    pub field_errors: FieldErrors,
    /// Precondition that stopped the last submit attempt
    pub blocking: Option<SubmitError>,
    /// Latest submission
    pub submission: SubmissionStatus,
    /// Edits received while a submission was in flight
    pub deferred: Vec<MovieFormAction>,
}

impl MovieFormState {
    /// Creates an empty form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the submit control should show as busy
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submission.is_in_flight()
    }
}

/// Actions for the movie entry form
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MovieFormAction {
    /// Replace a text field verbatim
    #[command]
    SetField {
        /// Field being edited
        field: MovieField,
        /// New text
        value: String,
    },

    /// Set the IMDb rating
    #[command]
    SetImdb {
        /// New rating
        value: f64,
    },

    /// Cast editor action
    #[command]
    Roster(RosterAction),

    /// Schedule editor action
    #[command]
    Schedule(ScheduleAction),

    /// Validate and send the movie
    #[command]
    Submit,

    /// Clear a shown outcome or blocking message
    #[command]
    DismissOutcome,

    /// Sink accepted the payload
    #[event]
    SubmissionSucceeded {
        /// Catalog acknowledgement
        receipt: SubmissionReceipt,
    },

    /// Sink refused the payload
    #[event]
    SubmissionFailed {
        /// Catalog error
        error: SubmissionError,
    },
}

/// Environment dependencies for the movie form
#[derive(Clone)]
pub struct MovieFormEnvironment {
    /// Catalog submission sink
    pub sink: Arc<dyn SubmissionSink>,
    /// Clock for outcome timestamps
    pub clock: Arc<dyn Clock>,
}

impl MovieFormEnvironment {
    /// Creates a new `MovieFormEnvironment`
    #[must_use]
    pub fn new(sink: Arc<dyn SubmissionSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }
}

type Scoped<R> = ScopedReducer<MovieFormState, MovieFormAction, MovieFormEnvironment, R>;

/// Reducer for the movie entry form
pub struct MovieFormReducer {
    roster: Scoped<RosterReducer>,
    schedule: Scoped<ScheduleReducer>,
}

impl Default for MovieFormReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieFormReducer {
    /// Creates a new `MovieFormReducer`
    #[must_use]
    pub fn new() -> Self {
        Self {
            roster: scope_reducer(
                RosterReducer::new(),
                |form: &mut MovieFormState| &mut form.roster,
                |action: MovieFormAction| match action {
                    MovieFormAction::Roster(inner) => Ok(inner),
                    other => Err(other),
                },
                MovieFormAction::Roster,
                |_: &MovieFormEnvironment| &(),
            ),
            schedule: scope_reducer(
                ScheduleReducer::new(),
                |form: &mut MovieFormState| &mut form.schedule,
                |action: MovieFormAction| match action {
                    MovieFormAction::Schedule(inner) => Ok(inner),
                    other => Err(other),
                },
                MovieFormAction::Schedule,
                |_: &MovieFormEnvironment| &(),
            ),
        }
    }

    fn set_field(state: &mut MovieFormState, field: MovieField, value: String) {
        if state.fields.set_text(field, value) {
            tracing::debug!(%field, "Field edited");
            state.field_errors.clear(field);
        } else {
            tracing::warn!(%field, "Ignoring text for a non-text field");
        }
    }

    fn set_imdb(state: &mut MovieFormState, value: f64) {
        tracing::debug!(imdb = value, "Rating edited");
        state.fields.imdb = value;
        if validate_rating(value).is_ok() {
            state.field_errors.clear(MovieField::Imdb);
        }
    }

    fn submit(state: &mut MovieFormState, env: &MovieFormEnvironment) -> SmallVec<[Effect<MovieFormAction>; 4]> {
        state.blocking = None;

        if let Err(errors) = state.fields.validate() {
            tracing::debug!(fields = errors.len(), "Submit halted: invalid fields");
            state.field_errors = errors.clone();
            state.blocking = Some(SubmitError::InvalidFields(errors));
            return SmallVec::new();
        }
        state.field_errors = FieldErrors::new();

        if state.roster.is_empty() {
            tracing::debug!("Submit halted: no cast");
            state.blocking = Some(SubmitError::MissingCast);
            return SmallVec::new();
        }

        if state.schedule.is_empty() {
            tracing::debug!("Submit halted: no show dates");
            state.blocking = Some(SubmitError::MissingSchedule);
            return SmallVec::new();
        }

        let payload = MoviePayload::assemble(&state.fields, &state.roster, &state.schedule);
        state.submission = SubmissionStatus::InFlight;

        tracing::info!(
            movie = %payload.name,
            cast = payload.cast.len(),
            dates = payload.showdate.len(),
            shows = payload.show_count(),
            "Submitting movie"
        );

        let sink = Arc::clone(&env.sink);
        smallvec![Effect::future(async move {
            match sink.submit(payload).await {
                Ok(receipt) => Some(MovieFormAction::SubmissionSucceeded { receipt }),
                Err(error) => Some(MovieFormAction::SubmissionFailed { error }),
            }
        })]
    }

    fn succeeded(state: &mut MovieFormState, receipt: SubmissionReceipt, env: &MovieFormEnvironment) {
        tracing::info!(movie_id = ?receipt.movie_id, "Movie added");

        state.fields = MovieFields::default();
        state.roster = RosterState::new();
        state.schedule = ScheduleState::new();
        state.field_errors = FieldErrors::new();
        state.blocking = None;
        state.submission = SubmissionStatus::Succeeded {
            movie_id: receipt.movie_id,
            at: env.clock.now(),
        };
    }

    fn failed(state: &mut MovieFormState, error: SubmissionError) {
        tracing::info!(%error, "Movie submission failed");
        state.submission = SubmissionStatus::Failed {
            reason: SubmitError::Rejected(error),
        };
    }

    /// Replays edits queued during the submission, in arrival order
    fn replay_deferred(
        &self,
        state: &mut MovieFormState,
        env: &MovieFormEnvironment,
    ) -> SmallVec<[Effect<MovieFormAction>; 4]> {
        let deferred = std::mem::take(&mut state.deferred);
        if !deferred.is_empty() {
            tracing::debug!(count = deferred.len(), "Replaying deferred edits");
        }

        let mut effects = SmallVec::new();
        for action in deferred {
            effects.extend(self.reduce(state, action, env));
        }
        effects
    }
}

impl Reducer for MovieFormReducer {
    type State = MovieFormState;
    type Action = MovieFormAction;
    type Environment = MovieFormEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if state.submission.is_in_flight() {
            match action {
                MovieFormAction::Submit => {
                    tracing::warn!("Submission already in flight, ignoring submit");
                    return SmallVec::new();
                },
                MovieFormAction::SubmissionSucceeded { .. } | MovieFormAction::SubmissionFailed { .. } => {},
                edit => {
                    tracing::debug!(action = edit.name(), "Deferring edit until submission completes");
                    state.deferred.push(edit);
                    return SmallVec::new();
                },
            }
        }

        match action {
            MovieFormAction::Roster(_) => self.roster.reduce(state, action, env),

            MovieFormAction::Schedule(_) => self.schedule.reduce(state, action, env),

            MovieFormAction::SetField { field, value } => {
                Self::set_field(state, field, value);
                SmallVec::new()
            },

            MovieFormAction::SetImdb { value } => {
                Self::set_imdb(state, value);
                SmallVec::new()
            },

            MovieFormAction::Submit => Self::submit(state, env),

            MovieFormAction::DismissOutcome => {
                state.blocking = None;
                if !matches!(state.submission, SubmissionStatus::InFlight) {
                    state.submission = SubmissionStatus::Idle;
                }
                SmallVec::new()
            },

            MovieFormAction::SubmissionSucceeded { receipt } => {
                if !state.submission.is_in_flight() {
                    tracing::warn!("Submission result arrived with nothing in flight");
                    return SmallVec::new();
                }
                Self::succeeded(state, receipt, env);
                self.replay_deferred(state, env)
            },

            MovieFormAction::SubmissionFailed { error } => {
                if !state.submission.is_in_flight() {
                    tracing::warn!(%error, "Submission result arrived with nothing in flight");
                    return SmallVec::new();
                }
                Self::failed(state, error);
                self.replay_deferred(state, env)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fields::tests::valid_fields;
    use crate::schedule::ScheduleGroup;
    use crate::sink::RecordingSink;
    use crate::types::CalendarDate;
    use chrono::{FixedOffset, TimeZone};
    use marquee_testing::{assertions, test_clock, ReducerTest};

    fn env() -> MovieFormEnvironment {
        MovieFormEnvironment::new(RecordingSink::new().shared(), Arc::new(test_clock()))
    }

    fn march_first() -> CalendarDate {
        CalendarDate::from_ymd(2025, 3, 1).unwrap()
    }

    fn ready_form() -> MovieFormState {
        MovieFormState {
            fields: valid_fields(),
            roster: RosterState {
                entries: vec!["Anna".to_string()],
                draft: String::new(),
            },
            schedule: ScheduleState {
                groups: vec![ScheduleGroup {
                    date: march_first(),
                    times: vec!["7:00 PM".to_string()],
                }],
                ..ScheduleState::new()
            },
            ..MovieFormState::new()
        }
    }

    fn in_flight() -> MovieFormState {
        MovieFormState {
            submission: SubmissionStatus::InFlight,
            ..ready_form()
        }
    }

    fn accepted(id: &str) -> MovieFormAction {
        MovieFormAction::SubmissionSucceeded {
            receipt: SubmissionReceipt {
                movie_id: Some(id.to_string()),
            },
        }
    }

    fn rejected(reason: &str) -> MovieFormAction {
        MovieFormAction::SubmissionFailed {
            error: SubmissionError::Rejected {
                reason: reason.to_string(),
            },
        }
    }

    #[test]
    fn nested_editor_actions_reach_their_editors() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .unwrap();

        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState::new())
            .when_actions([
                MovieFormAction::Roster(RosterAction::SetDraft {
                    text: "Anna".to_string(),
                }),
                MovieFormAction::Roster(RosterAction::CommitDraft),
                MovieFormAction::Schedule(ScheduleAction::SelectDate { at }),
                MovieFormAction::Schedule(ScheduleAction::SetPendingTime {
                    text: "7:00 PM".to_string(),
                }),
                MovieFormAction::Schedule(ScheduleAction::CommitTime),
            ])
            .then_state(|state| {
                assert_eq!(state.roster.entries, vec!["Anna"]);
                assert_eq!(state.schedule.groups.len(), 1);
                assert_eq!(state.schedule.groups[0].date, march_first());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn invalid_fields_halt_before_the_sink() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                fields: MovieFields {
                    url: "poster.jpg".to_string(),
                    imdb: 12.0,
                    ..valid_fields()
                },
                ..ready_form()
            })
            .when_action(MovieFormAction::Submit)
            .then_state(|state| {
                assert_eq!(state.field_errors.len(), 2);
                assert!(state.field_errors.get(MovieField::PosterUrl).is_some());
                assert!(matches!(state.blocking, Some(SubmitError::InvalidFields(_))));
                assert_eq!(state.submission, SubmissionStatus::Idle);
                // Collections untouched
                assert_eq!(state.roster.len(), 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn empty_roster_halts_with_missing_cast() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                roster: RosterState::new(),
                ..ready_form()
            })
            .when_action(MovieFormAction::Submit)
            .then_state(|state| {
                assert_eq!(state.blocking, Some(SubmitError::MissingCast));
                assert!(!state.is_submitting());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn empty_schedule_halts_with_missing_schedule() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                schedule: ScheduleState::new(),
                ..ready_form()
            })
            .when_action(MovieFormAction::Submit)
            .then_state(|state| {
                assert_eq!(state.blocking, Some(SubmitError::MissingSchedule));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn field_errors_outrank_missing_collections() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState::new())
            .when_action(MovieFormAction::Submit)
            .then_state(|state| {
                assert!(matches!(state.blocking, Some(SubmitError::InvalidFields(_))));
            })
            .run();
    }

    #[test]
    fn valid_form_goes_in_flight_with_one_effect() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(ready_form())
            .when_action(MovieFormAction::Submit)
            .then_state(|state| {
                assert!(state.is_submitting());
                assert_eq!(state.blocking, None);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(ready_form())
            .when_action(MovieFormAction::Submit)
            .when_action(MovieFormAction::Submit)
            .then_state(|state| assert!(state.deferred.is_empty()))
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn success_resets_every_editor() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(in_flight())
            .when_action(accepted("m-42"))
            .then_state(|state| {
                assert_eq!(state.fields, MovieFields::default());
                assert!(state.roster.is_empty());
                assert!(state.schedule.is_empty());
                assert!(state.schedule.pending_date.is_none());
                assert_eq!(
                    state.submission,
                    SubmissionStatus::Succeeded {
                        movie_id: Some("m-42".to_string()),
                        at: test_clock().now(),
                    }
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failure_keeps_everything_for_retry() {
        let expected = ready_form();

        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(in_flight())
            .when_action(rejected("Movie already exists"))
            .then_state(move |state| {
                assert_eq!(state.fields, expected.fields);
                assert_eq!(state.roster, expected.roster);
                assert_eq!(state.schedule, expected.schedule);
                let SubmissionStatus::Failed { reason } = &state.submission else {
                    panic!("expected a failed submission");
                };
                assert_eq!(reason.to_string(), "Failed to add movie: Movie already exists");
            })
            .run();
    }

    #[test]
    fn retry_after_failure_submits_again() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(in_flight())
            .when_action(rejected("Timeout"))
            .when_action(MovieFormAction::Submit)
            .then_state(|state| assert!(state.is_submitting()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn edits_during_flight_are_replayed_after_reset() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(in_flight())
            .when_action(MovieFormAction::Roster(RosterAction::SetDraft {
                text: "Ben".to_string(),
            }))
            .when_action(MovieFormAction::Roster(RosterAction::CommitDraft))
            .when_action(MovieFormAction::SetField {
                field: MovieField::Name,
                value: "Sequel".to_string(),
            })
            .then_state(|state| {
                // Frozen while in flight
                assert_eq!(state.roster.entries, vec!["Anna"]);
                assert_eq!(state.deferred.len(), 3);
            })
            .run();

        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                deferred: vec![
                    MovieFormAction::Roster(RosterAction::SetDraft {
                        text: "Ben".to_string(),
                    }),
                    MovieFormAction::Roster(RosterAction::CommitDraft),
                    MovieFormAction::SetField {
                        field: MovieField::Name,
                        value: "Sequel".to_string(),
                    },
                ],
                ..in_flight()
            })
            .when_action(accepted("m-1"))
            .then_state(|state| {
                assert_eq!(state.roster.entries, vec!["Ben"]);
                assert_eq!(state.fields.name, "Sequel");
                assert!(state.deferred.is_empty());
            })
            .run();
    }

    #[test]
    fn edits_during_flight_land_on_intact_state_after_failure() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(in_flight())
            .when_action(MovieFormAction::Roster(RosterAction::SetDraft {
                text: "Ben".to_string(),
            }))
            .when_action(MovieFormAction::Roster(RosterAction::CommitDraft))
            .when_action(rejected("Server error"))
            .then_state(|state| {
                assert_eq!(state.roster.entries, vec!["Anna", "Ben"]);
                assert!(matches!(state.submission, SubmissionStatus::Failed { .. }));
            })
            .run();
    }

    #[test]
    fn stray_outcome_is_ignored() {
        let expected = ready_form();

        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(ready_form())
            .when_action(accepted("m-9"))
            .then_state(move |state| assert_eq!(*state, expected))
            .run();
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                fields: MovieFields {
                    genre: String::new(),
                    imdb: -1.0,
                    ..valid_fields()
                },
                ..ready_form()
            })
            .when_action(MovieFormAction::Submit)
            .when_action(MovieFormAction::SetField {
                field: MovieField::Genre,
                value: "Drama".to_string(),
            })
            .when_action(MovieFormAction::SetImdb { value: 7.0 })
            .then_state(|state| {
                assert!(state.field_errors.is_empty());
                assert_eq!(state.fields.genre, "Drama");
            })
            .run();
    }

    #[test]
    fn dismiss_clears_outcome_and_blocking() {
        ReducerTest::new(MovieFormReducer::new())
            .with_env(env())
            .given_state(MovieFormState {
                blocking: Some(SubmitError::MissingCast),
                submission: SubmissionStatus::Failed {
                    reason: SubmitError::MissingSchedule,
                },
                ..MovieFormState::new()
            })
            .when_action(MovieFormAction::DismissOutcome)
            .then_state(|state| {
                assert_eq!(state.blocking, None);
                assert_eq!(state.submission, SubmissionStatus::Idle);
            })
            .run();
    }
}
