//! # Marquee Testing
//!
//! Testing utilities and helpers for Marquee reducers.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given/When/Then harness for reducers
//! - [`assertions`]: Effect assertion helpers
//! - [`mocks::FixedClock`]: Deterministic time
//! - [`init_test_tracing`]: Opt-in log output for failing tests
//!
//! ## Example
//!
//! ```ignore
//! use marquee_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(RosterReducer::new())
//!     .with_env(())
//!     .given_state(RosterState::default())
//!     .when_actions([
//!         RosterAction::SetDraft { text: "Anna".into() },
//!         RosterAction::CommitDraft,
//!     ])
//!     .then_state(|state| assert_eq!(state.entries, vec!["Anna"]))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use marquee_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_testing::mocks::FixedClock;
    /// use marquee_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honours `RUST_LOG`; safe to call from every test since only the first
/// call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
