//! # Marquee Core
//!
//! Core traits and types shared by every Marquee editor.
//!
//! Each editor in the storefront is expressed as a reducer:
//!
//! - **State**: Owned, cloneable data for one editor (roster, schedule, panel)
//! - **Action**: Every input the editor reacts to (user intents and effect feedback)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: A description of work for the runtime (e.g. calling a submission sink)
//! - **Environment**: Collaborators injected through traits
//!
//! Reducers never perform I/O themselves. Anything asynchronous is returned
//! as an [`Effect`](effect::Effect) and executed by the runtime, whose result
//! comes back as another action.
//!
//! ## Example
//!
//! ```
//! use marquee_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct TallyState {
//!     seats: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum TallyAction {
//!     Reserve,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = TallyState;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TallyState,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         match action {
//!             TallyAction::Reserve => state.seats += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = TallyState::default();
//! let effects = TallyReducer.reduce(&mut state, TallyAction::Reserve, &());
//! assert_eq!(state.seats, 1);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub use effect::Effect;
pub use reducer::Reducer;

/// Reducer composition utilities
pub mod composition;

/// Reducer module - The core trait for editor logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold every rule about how an editor's state may change and are
/// deterministic and testable without a runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for editor logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected collaborators this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for RosterReducer {
    ///     type State = RosterState;
    ///     type Action = RosterAction;
    ///     type Environment = ();
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut RosterState,
    ///         action: RosterAction,
    ///         _env: &(),
    ///     ) -> SmallVec<[Effect<RosterAction>; 4]> {
    ///         match action {
    ///             RosterAction::CommitDraft => { /* ... */ }
    ///             _ => {}
    ///         }
    ///         SmallVec::new()
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected collaborators
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Checks the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected collaborators
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime (usually none)
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe work to be performed by the runtime. They are values,
/// not execution, and can be composed and re-targeted with [`Effect::map`].
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    /// Boxed future produced by an [`Effect::Future`]
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should
    /// happen, returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(EffectFuture<Action>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation whose output is fed back as an action
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Whether this effect does nothing at all
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }

        /// Re-target an effect so the actions it produces are wrapped for a parent
        ///
        /// Used when a child reducer is embedded in a larger one: the child's
        /// effects produce child actions, which the parent lifts into its own
        /// action type before handing them to the runtime.
        #[must_use]
        pub fn map<Parent, F>(self, f: F) -> Effect<Parent>
        where
            Action: Send + 'static,
            Parent: Send + 'static,
            F: Fn(Action) -> Parent + Send + Sync + 'static,
        {
            self.map_shared(Arc::new(f))
        }

        fn map_shared<Parent>(
            self,
            f: Arc<dyn Fn(Action) -> Parent + Send + Sync>,
        ) -> Effect<Parent>
        where
            Action: Send + 'static,
            Parent: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects
                        .into_iter()
                        .map(|effect| effect.map_shared(Arc::clone(&f)))
                        .collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects
                        .into_iter()
                        .map(|effect| effect.map_shared(Arc::clone(&f)))
                        .collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(&*f) }))
                },
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external collaborators are abstracted behind traits and injected via
/// the Environment parameter. Editors that need nothing use `()`.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock implementation of [`Clock`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Child {
        Ping,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn map_rewraps_delayed_action() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(Child::Ping),
        };

        match effect.map(Parent::Child) {
            Effect::Delay { action, .. } => assert_eq!(*action, Parent::Child(Child::Ping)),
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn map_rewraps_future_output() {
        let effect: Effect<Child> = Effect::future(async { Some(Child::Ping) });

        let Effect::Future(fut) = effect.map(Parent::Child) else {
            panic!("expected a future effect");
        };
        let produced = tokio_test::block_on(fut);
        assert_eq!(produced, Some(Parent::Child(Child::Ping)));
    }

    #[test]
    fn nested_none_is_none() {
        let effect: Effect<Child> =
            Effect::merge(vec![Effect::None, Effect::chain(vec![Effect::None])]);
        assert!(effect.is_none());

        let effect: Effect<Child> = Effect::merge(vec![Effect::future(async { None })]);
        assert!(!effect.is_none());
    }
}
