//! End-to-end editor flows through a live `Store`
//!
//! Effects run on the tokio runtime and their result actions are fed back,
//! exactly as in the hosting application.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{FixedOffset, TimeZone};
use marquee_runtime::Store;
use marquee_storefront::{
    card::CardDetails,
    error::SubmitError,
    fields::{MovieField, MovieFields},
    movie_form::SubmissionStatus,
    payment_methods::InMemoryWallet,
    sink::{RecordingSink, SubmissionError},
    CalendarDate, MovieFormAction, MovieFormEnvironment, MovieFormReducer, MovieFormState,
    PaymentMethodId, RosterAction, ScheduleAction, SelectionAction, SelectionEnvironment,
    SelectionError, SelectionReducer, SelectionState, PAYMENT_METHOD_CAPACITY,
};
use marquee_testing::{init_test_tracing, test_clock};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

type FormStore = Store<MovieFormState, MovieFormAction, MovieFormEnvironment, MovieFormReducer>;

fn form_store(sink: &RecordingSink) -> FormStore {
    init_test_tracing();
    let env = MovieFormEnvironment::new(sink.shared(), Arc::new(test_clock()));
    Store::new(MovieFormState::new(), MovieFormReducer::new(), env)
}

fn filled_fields() -> MovieFields {
    MovieFields {
        name: "Night Train".to_string(),
        url: "https://img.example.com/night-train.jpg".to_string(),
        category: "Now Playing".to_string(),
        genre: "Thriller".to_string(),
        director: "Ada Brooks".to_string(),
        producer: "Lee Park".to_string(),
        synopsis: "Strangers share a sleeper car.".to_string(),
        trailer_url: "https://video.example.com/night-train".to_string(),
        imdb: 6.9,
        mpaa: "R".to_string(),
    }
}

async fn fill_fields(store: &FormStore) {
    let fields = filled_fields();
    for field in MovieField::TEXT {
        let value = fields.text(field).unwrap().to_string();
        store.send(MovieFormAction::SetField { field, value }).await.unwrap();
    }
    store
        .send(MovieFormAction::SetImdb { value: fields.imdb })
        .await
        .unwrap();
}

async fn add_cast(store: &FormStore, name: &str) {
    store
        .send(MovieFormAction::Roster(RosterAction::SetDraft {
            text: name.to_string(),
        }))
        .await
        .unwrap();
    store
        .send(MovieFormAction::Roster(RosterAction::CommitDraft))
        .await
        .unwrap();
}

async fn add_show(store: &FormStore, day: u32, hour: u32, time: &str) {
    let at = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2025, 3, day, hour, 0, 0)
        .unwrap();
    for action in [
        ScheduleAction::SelectDate { at },
        ScheduleAction::SetPendingTime {
            text: time.to_string(),
        },
        ScheduleAction::CommitTime,
    ] {
        store.send(MovieFormAction::Schedule(action)).await.unwrap();
    }
}

#[tokio::test]
async fn accepted_submission_resets_the_form_and_reaches_the_sink() {
    let sink = RecordingSink::new();
    let store = form_store(&sink);

    fill_fields(&store).await;
    add_cast(&store, "Anna").await;
    add_cast(&store, "Ben").await;
    add_show(&store, 1, 0, "7:00 PM").await;
    add_show(&store, 1, 23, "9:30 PM").await;
    add_show(&store, 2, 12, "6:00 PM").await;

    let mut handle = store.send(MovieFormAction::Submit).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let state = store.snapshot().await;
    assert!(matches!(state.submission, SubmissionStatus::Succeeded { movie_id: Some(_), .. }));
    assert!(state.roster.is_empty());
    assert!(state.schedule.is_empty());
    assert_eq!(state.fields, MovieFields::default());

    let accepted = sink.accepted();
    assert_eq!(accepted.len(), 1);
    let payload = &accepted[0];
    assert_eq!(payload.cast, vec!["Anna", "Ben"]);
    assert_eq!(payload.showdate.len(), 2);
    assert_eq!(payload.showdate[0].date, CalendarDate::from_ymd(2025, 3, 1).unwrap());
    assert_eq!(payload.showdate[0].times, vec!["7:00 PM", "9:30 PM"]);
    assert_eq!(payload.showtime, vec![vec!["7:00 PM", "9:30 PM"], vec!["6:00 PM"]]);
}

#[tokio::test]
async fn missing_cast_never_reaches_the_sink() {
    let sink = RecordingSink::new();
    let store = form_store(&sink);

    fill_fields(&store).await;
    add_show(&store, 1, 20, "8:00 PM").await;

    let mut handle = store.send(MovieFormAction::Submit).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let state = store.snapshot().await;
    assert_eq!(state.blocking, Some(SubmitError::MissingCast));
    assert_eq!(state.submission, SubmissionStatus::Idle);
    assert_eq!(sink.attempts(), 0);
}

#[tokio::test]
async fn rejected_submission_keeps_state_and_retry_succeeds() {
    let sink = RecordingSink::new();
    sink.fail_next(SubmissionError::Rejected {
        reason: "Duplicate movie name".to_string(),
    });
    let store = form_store(&sink);

    fill_fields(&store).await;
    add_cast(&store, "Anna").await;
    add_show(&store, 3, 18, "6:00 PM").await;

    let mut handle = store.send(MovieFormAction::Submit).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let state = store.snapshot().await;
    let SubmissionStatus::Failed { reason } = &state.submission else {
        panic!("expected failure, got {:?}", state.submission);
    };
    assert_eq!(reason.to_string(), "Failed to add movie: Duplicate movie name");
    assert_eq!(state.roster.entries, vec!["Anna"]);
    assert_eq!(state.schedule.show_count(), 1);
    assert_eq!(state.fields, filled_fields());

    let mut handle = store.send(MovieFormAction::Submit).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert!(matches!(
        store.state(|s| s.submission.clone()).await,
        SubmissionStatus::Succeeded { .. }
    ));
    assert_eq!(sink.attempts(), 2);
    assert_eq!(sink.accepted().len(), 1);
}

#[tokio::test]
async fn edits_sent_during_submission_apply_after_it() {
    let sink = RecordingSink::new().with_latency(Duration::from_millis(50));
    let store = form_store(&sink);

    fill_fields(&store).await;
    add_cast(&store, "Anna").await;
    add_show(&store, 1, 19, "7:00 PM").await;

    let mut handle = store.send(MovieFormAction::Submit).await.unwrap();
    assert!(store.state(MovieFormState::is_submitting).await);

    // Arrives while the sink is still working
    add_cast(&store, "Next Movie Lead").await;
    store.send(MovieFormAction::Submit).await.unwrap();
    assert_eq!(store.state(|s| s.roster.entries.clone()).await, vec!["Anna"]);

    handle.wait_with_timeout(WAIT).await.unwrap();

    let state = store.snapshot().await;
    assert_eq!(sink.attempts(), 1);
    assert_eq!(sink.accepted()[0].cast, vec!["Anna"]);
    assert_eq!(state.roster.entries, vec!["Next Movie Lead"]);
    assert!(state.deferred.is_empty());
}

#[tokio::test]
async fn shutdown_lets_an_in_flight_submission_finish() {
    let sink = RecordingSink::new().with_latency(Duration::from_millis(50));
    let store = form_store(&sink);

    fill_fields(&store).await;
    add_cast(&store, "Anna").await;
    add_show(&store, 2, 20, "8:00 PM").await;

    store.send(MovieFormAction::Submit).await.unwrap();
    assert!(store.state(MovieFormState::is_submitting).await);

    store.shutdown(WAIT).await.unwrap();

    let state = store.snapshot().await;
    assert_eq!(sink.accepted().len(), 1);
    assert!(matches!(state.submission, SubmissionStatus::Succeeded { movie_id: Some(_), .. }));
    assert!(state.roster.is_empty());
    assert!(state.schedule.is_empty());
    assert_eq!(state.fields, MovieFields::default());
}

#[tokio::test]
async fn observers_see_a_snapshot_per_action() {
    let sink = RecordingSink::new();
    let store = form_store(&sink);
    let mut snapshots = store.subscribe();

    add_cast(&store, "Anna").await;

    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow_and_update().roster.entries, vec!["Anna"]);
}

fn selection_store(wallet: &InMemoryWallet) -> Store<SelectionState, SelectionAction, SelectionEnvironment, SelectionReducer> {
    init_test_tracing();
    let env = SelectionEnvironment::new(wallet.source(), wallet.gateway());
    Store::new(SelectionState::default(), SelectionReducer::new(), env)
}

fn discover_card() -> CardDetails {
    CardDetails {
        card_number: "6011000990139424".to_string(),
        card_name: "Bob Parr".to_string(),
        exp: "11/29".to_string(),
        cvv: "321".to_string(),
        address: "1200 Metroville Ave".to_string(),
        card_type: "discover".to_string(),
    }
}

#[tokio::test]
async fn load_select_and_add_up_to_capacity() {
    let wallet = InMemoryWallet::sample();
    let store = selection_store(&wallet);

    store
        .send(SelectionAction::Load)
        .await
        .unwrap()
        .wait_with_timeout(WAIT)
        .await
        .unwrap();
    assert_eq!(store.state(|s| s.items.len()).await, 2);

    store
        .send(SelectionAction::Select {
            id: PaymentMethodId::new(1),
        })
        .await
        .unwrap();

    store.send(SelectionAction::BeginAdd).await.unwrap();
    store
        .send(SelectionAction::SubmitCard {
            details: discover_card(),
        })
        .await
        .unwrap()
        .wait_with_timeout(WAIT)
        .await
        .unwrap();

    let state = store.snapshot().await;
    assert_eq!(state.items.len(), PAYMENT_METHOD_CAPACITY);
    assert_eq!(state.items[2].last_four, "9424");
    assert_eq!(state.selected_id, Some(PaymentMethodId::new(1)));
    assert!(!state.is_adding());
    assert_eq!(wallet.methods().len(), 3);

    store.send(SelectionAction::BeginAdd).await.unwrap();
    assert_eq!(store.snapshot().await, state);
}

#[tokio::test]
async fn declined_card_stays_in_the_add_form() {
    let wallet = InMemoryWallet::sample();
    wallet.decline_next("Do not honor");
    let store = selection_store(&wallet);

    store
        .send(SelectionAction::Load)
        .await
        .unwrap()
        .wait_with_timeout(WAIT)
        .await
        .unwrap();
    store.send(SelectionAction::BeginAdd).await.unwrap();

    let result = store
        .send_and_wait_for(
            SelectionAction::SubmitCard {
                details: discover_card(),
            },
            |action| matches!(action, SelectionAction::AddFailed { .. }),
            WAIT,
        )
        .await
        .unwrap();
    assert!(result.is_event());

    // The result is broadcast before it is reduced; drain effects first
    store.shutdown(WAIT).await.unwrap();
    let state = store.snapshot().await;
    assert!(state.is_adding());
    assert!(!state.is_saving());
    assert!(matches!(state.last_error, Some(SelectionError::Gateway(_))));
    assert_eq!(state.items.len(), 2);
}
