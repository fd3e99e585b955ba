//! Reducer composition utilities
//!
//! Larger editors are assembled from smaller ones. [`scope_reducer`] embeds a
//! child reducer inside a parent:
//!
//! - the parent state owns the child state (`state` projection)
//! - the parent action enum has a variant wrapping the child action
//!   (`extract` / `embed`)
//! - the parent environment can hand out the child environment (`env`)
//!
//! Child effects are re-targeted with [`Effect::map`] so their feedback
//! actions arrive wrapped in the parent's action type.
//!
//! # Examples
//!
//! ```
//! use marquee_core::{Reducer, Effect, SmallVec};
//! use marquee_core::composition::scope_reducer;
//!
//! #[derive(Clone, Debug, Default)]
//! struct SeatState {
//!     held: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum SeatAction {
//!     Hold,
//! }
//!
//! struct SeatReducer;
//!
//! impl Reducer for SeatReducer {
//!     type State = SeatState;
//!     type Action = SeatAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut SeatState, _action: SeatAction, _env: &()) -> SmallVec<[Effect<SeatAction>; 4]> {
//!         state.held += 1;
//!         SmallVec::new()
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct HallState {
//!     seats: SeatState,
//!     title: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum HallAction {
//!     Seat(SeatAction),
//!     Rename(String),
//! }
//!
//! let scoped = scope_reducer(
//!     SeatReducer,
//!     |hall: &mut HallState| &mut hall.seats,
//!     |action: HallAction| match action {
//!         HallAction::Seat(inner) => Ok(inner),
//!         other => Err(other),
//!     },
//!     HallAction::Seat,
//!     |_: &()| &(),
//! );
//!
//! let mut state = HallState::default();
//! scoped.reduce(&mut state, HallAction::Seat(SeatAction::Hold), &());
//! scoped.reduce(&mut state, HallAction::Rename("Hall 2".into()), &());
//! assert_eq!(state.seats.held, 1);
//! ```

pub use crate::effect::Effect;
pub use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Projects the child state out of the parent state
pub type StateProjection<S, SubS> = fn(&mut S) -> &mut SubS;

/// Splits a parent action into the child action, or hands it back untouched
pub type ActionExtract<A, SubA> = fn(A) -> Result<SubA, A>;

/// Wraps a child action into the parent action type
pub type ActionEmbed<A, SubA> = fn(SubA) -> A;

/// Projects the child environment out of the parent environment
pub type EnvironmentProjection<E, SubE> = fn(&E) -> &SubE;

/// Embeds `reducer` into a parent state, action and environment.
///
/// Parent actions that `extract` rejects are ignored by the scoped reducer
/// and produce no effects.
pub fn scope_reducer<S, A, E, R>(
    reducer: R,
    state: StateProjection<S, R::State>,
    extract: ActionExtract<A, R::Action>,
    embed: ActionEmbed<A, R::Action>,
    env: EnvironmentProjection<E, R::Environment>,
) -> ScopedReducer<S, A, E, R>
where
    R: Reducer,
{
    ScopedReducer {
        reducer,
        state,
        extract,
        embed,
        env,
    }
}

/// A child reducer lifted into a parent's state and action space.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, A, E, R>
where
    R: Reducer,
{
    reducer: R,
    state: StateProjection<S, R::State>,
    extract: ActionExtract<A, R::Action>,
    embed: ActionEmbed<A, R::Action>,
    env: EnvironmentProjection<E, R::Environment>,
}

impl<S, A, E, R> ScopedReducer<S, A, E, R>
where
    R: Reducer,
{
    /// The wrapped child reducer
    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.reducer
    }
}

impl<S, A, E, R> Reducer for ScopedReducer<S, A, E, R>
where
    R: Reducer,
    R::Action: Send + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Ok(child_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let child_state = (self.state)(state);
        let child_env = (self.env)(env);

        self.reducer
            .reduce(child_state, child_action, child_env)
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}
