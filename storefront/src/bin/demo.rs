//! Storefront Demo
//!
//! Scripted walk-through of the two editors running in live stores:
//! - An admin composes a movie: cast, show schedule and catalog fields
//! - A first submit is halted by validation, a second one is accepted
//! - A customer picks a stored card and adds a new one up to the limit
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=marquee_storefront=debug cargo run --bin demo
//! ```

use anyhow::{bail, Context};
use chrono::{FixedOffset, TimeZone};
use marquee_core::environment::SystemClock;
use marquee_runtime::Store;
use marquee_storefront::{
    card::CardDetails,
    fields::MovieField,
    movie_form::SubmissionStatus,
    payment_methods::InMemoryWallet,
    sink::RecordingSink,
    Config, MovieFormAction, MovieFormEnvironment, MovieFormReducer, MovieFormState, PaymentMethodId,
    RosterAction, ScheduleAction, SelectionAction, SelectionEnvironment, SelectionReducer,
    SelectionState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🎬 ============================================");
    println!("   Marquee Storefront - Live Demo");
    println!("============================================\n");

    compose_movie(&config).await?;
    manage_cards(&config).await?;

    println!("\n✓ Demo complete\n");
    Ok(())
}

async fn compose_movie(config: &Config) -> anyhow::Result<()> {
    println!("1️⃣  Composing a movie in the admin console...");

    let sink = RecordingSink::new().with_latency(config.submit_delay());
    let env = MovieFormEnvironment::new(sink.shared(), Arc::new(SystemClock));
    let store = Store::with_config(
        MovieFormState::new(),
        MovieFormReducer::new(),
        env,
        config.store_config(),
    );

    let evening = FixedOffset::west_opt(5 * 3600)
        .and_then(|offset| offset.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).single())
        .context("invalid show date")?;

    let edits = vec![
        MovieFormAction::Roster(RosterAction::SetDraft {
            text: "  Anna ".to_string(),
        }),
        MovieFormAction::Roster(RosterAction::CommitDraft),
        // Re-adding the same name is ignored
        MovieFormAction::Roster(RosterAction::SetDraft {
            text: "Anna".to_string(),
        }),
        MovieFormAction::Roster(RosterAction::CommitDraft),
        MovieFormAction::Schedule(ScheduleAction::SelectDate { at: evening }),
        MovieFormAction::Schedule(ScheduleAction::SetPendingTime {
            text: "7:00 PM".to_string(),
        }),
        MovieFormAction::Schedule(ScheduleAction::CommitTime),
        MovieFormAction::Schedule(ScheduleAction::SetPendingTime {
            text: "9:30 PM".to_string(),
        }),
        MovieFormAction::Schedule(ScheduleAction::CommitTime),
    ];
    for action in edits {
        store.send(action).await?;
    }

    let (cast, groups) = store
        .state(|s| (s.roster.entries.clone(), s.schedule.groups.clone()))
        .await;
    println!("   Cast: {cast:?}");
    for group in &groups {
        println!("   {}: {:?}", group.date, group.times);
    }

    println!("\n2️⃣  Submitting with empty fields...");
    store.send(MovieFormAction::Submit).await?;
    if let Some(blocking) = store.state(|s| s.blocking.clone()).await {
        println!("   ✗ {blocking}");
    }

    let fields = [
        (MovieField::Name, "The Long Intermission"),
        (MovieField::PosterUrl, "https://img.example.com/intermission.jpg"),
        (MovieField::Category, "Coming Soon"),
        (MovieField::Genre, "Drama"),
        (MovieField::Director, "Rosa Ito"),
        (MovieField::Producer, "Sam Ochoa"),
        (MovieField::Synopsis, "A projectionist keeps the last cinema in town alive."),
        (MovieField::TrailerUrl, "https://video.example.com/intermission"),
        (MovieField::Mpaa, "PG"),
    ];
    for (field, value) in fields {
        store
            .send(MovieFormAction::SetField {
                field,
                value: value.to_string(),
            })
            .await?;
    }
    store.send(MovieFormAction::SetImdb { value: 7.8 }).await?;

    println!("\n3️⃣  Submitting the completed form...");
    let mut handle = store.send(MovieFormAction::Submit).await?;
    handle.wait_with_timeout(WAIT).await?;

    match store.state(|s| s.submission.clone()).await {
        SubmissionStatus::Succeeded { movie_id, at } => {
            println!("   ✓ Movie added ({}) at {at}", movie_id.unwrap_or_default());
        },
        other => bail!("unexpected submission outcome: {other:?}"),
    }

    if let Some(payload) = sink.accepted().first() {
        println!("   Payload:\n{}", serde_json::to_string_pretty(payload)?);
    }

    store.shutdown(WAIT).await?;
    Ok(())
}

async fn manage_cards(config: &Config) -> anyhow::Result<()> {
    println!("\n4️⃣  Choosing a payment method at checkout...");

    let wallet = InMemoryWallet::sample();
    let env = SelectionEnvironment::new(wallet.source(), wallet.gateway());
    let store = Store::with_config(
        SelectionState::default(),
        SelectionReducer::new(),
        env,
        config.store_config(),
    );

    store.send(SelectionAction::Load).await?.wait_with_timeout(WAIT).await?;
    store
        .send(SelectionAction::Select {
            id: PaymentMethodId::new(2),
        })
        .await?;

    let (count, selected) = store
        .state(|s| (s.items.len(), s.selected().map(|m| m.id)))
        .await;
    println!("   {count} stored cards, selected {selected:?}");

    println!("\n5️⃣  Adding a card...");
    store.send(SelectionAction::BeginAdd).await?;
    let details = CardDetails {
        card_number: "6011000990139424".to_string(),
        card_name: "Bob Parr".to_string(),
        exp: "11/29".to_string(),
        cvv: "321".to_string(),
        address: "1200 Metroville Ave".to_string(),
        card_type: "discover".to_string(),
    };
    store
        .send(SelectionAction::SubmitCard { details })
        .await?
        .wait_with_timeout(WAIT)
        .await?;

    let (count, can_add) = store.state(|s| (s.items.len(), s.can_begin_add())).await;
    println!("   {count} stored cards, add enabled: {can_add}");

    store.send(SelectionAction::BeginAdd).await?;
    if !store.state(SelectionState::is_adding).await {
        println!("   ✓ Add refused at capacity");
    }

    store.shutdown(WAIT).await?;
    Ok(())
}
