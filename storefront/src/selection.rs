//! Payment-method selection panel.
//!
//! Lists the customer's stored cards, keeps at most one of them selected and
//! runs the add-a-card sub-flow. The list is owned by the payment service;
//! the panel only replaces it wholesale on `Loaded` and appends the card the
//! gateway returns on `CompleteAdd`.
//!
//! # Invariants
//!
//! - `selected_id` is `None` or the id of a listed item.
//! - The mode is `Adding` only while fewer than [`PAYMENT_METHOD_CAPACITY`]
//!   items are listed. `BeginAdd` at capacity leaves the state untouched.
//! - At most one card save is in flight.

use crate::card::{CardDetails, CardErrors};
use crate::error::SelectionError;
use crate::payment_methods::{GatewayError, PaymentMethodGateway, PaymentMethodSource};
use crate::types::{PaymentMethod, PaymentMethodId};
use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use marquee_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Most payment methods a customer may store
pub const PAYMENT_METHOD_CAPACITY: usize = 3;

/// Whether the add-a-card sub-flow is open
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddMode {
    /// Add form closed
    #[default]
    Idle,
    /// Add form open
    Adding {
        /// Card details are with the gateway
        saving: bool,
        /// Validation errors from the last attempt
        errors: CardErrors,
    },
}

impl AddMode {
    const fn open() -> Self {
        Self::Adding {
            saving: false,
            errors: CardErrors::new(),
        }
    }
}

/// State of the selection panel
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Stored payment methods, in service order
    pub items: Vec<PaymentMethod>,
    /// The chosen payment method
    pub selected_id: Option<PaymentMethodId>,
    /// Add sub-flow
    pub mode: AddMode,
    /// A listing request is in flight
    pub loading: bool,
    /// Most recent refusal or failure
    pub last_error: Option<SelectionError>,
}

impl SelectionState {
    /// Creates a panel over an already fetched list
    #[must_use]
    pub fn with_items(items: Vec<PaymentMethod>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Whether the add form is open ("pending add")
    #[must_use]
    pub const fn is_adding(&self) -> bool {
        matches!(self.mode, AddMode::Adding { .. })
    }

    /// Whether a card save is in flight
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        matches!(self.mode, AddMode::Adding { saving: true, .. })
    }

    /// The selected payment method
    #[must_use]
    pub fn selected(&self) -> Option<&PaymentMethod> {
        let id = self.selected_id?;
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether `id` is listed
    #[must_use]
    pub fn contains(&self, id: PaymentMethodId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Checks that another card fits
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::CapacityReached`] when the list is full.
    pub fn ensure_capacity(&self) -> Result<(), SelectionError> {
        if self.items.len() < PAYMENT_METHOD_CAPACITY {
            Ok(())
        } else {
            Err(SelectionError::CapacityReached {
                capacity: PAYMENT_METHOD_CAPACITY,
            })
        }
    }

    /// Whether the Add Card control should be enabled
    #[must_use]
    pub fn can_begin_add(&self) -> bool {
        !self.is_adding() && self.ensure_capacity().is_ok()
    }
}

/// Actions for the selection panel
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionAction {
    /// Fetch the stored payment methods
    #[command]
    Load,

    /// Choose a listed payment method
    #[command]
    Select {
        /// Payment method to select
        id: PaymentMethodId,
    },

    /// Open the add form
    #[command]
    BeginAdd,

    /// Close the add form
    #[command]
    CancelAdd,

    /// Validate the card form and send it to the gateway
    #[command]
    SubmitCard {
        /// Card form input
        details: CardDetails,
    },

    /// Listing arrived
    #[event]
    Loaded {
        /// Stored payment methods
        items: Vec<PaymentMethod>,
    },

    /// Listing failed
    #[event]
    LoadFailed {
        /// Failure reported by the source
        error: GatewayError,
    },

    /// Gateway stored the new card
    #[event]
    CompleteAdd {
        /// Newly stored payment method
        item: PaymentMethod,
    },

    /// Gateway refused the new card
    #[event]
    AddFailed {
        /// Failure reported by the gateway
        error: GatewayError,
    },
}

/// Environment dependencies for the selection panel
#[derive(Clone)]
pub struct SelectionEnvironment {
    /// Lists stored payment methods
    pub source: Arc<dyn PaymentMethodSource>,
    /// Stores new cards
    pub gateway: Arc<dyn PaymentMethodGateway>,
}

impl SelectionEnvironment {
    /// Creates a new `SelectionEnvironment`
    #[must_use]
    pub fn new(source: Arc<dyn PaymentMethodSource>, gateway: Arc<dyn PaymentMethodGateway>) -> Self {
        Self { source, gateway }
    }
}

/// Reducer for the selection panel
#[derive(Clone, Debug, Default)]
pub struct SelectionReducer;

impl SelectionReducer {
    /// Creates a new `SelectionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn loaded(state: &mut SelectionState, items: Vec<PaymentMethod>) {
        state.loading = false;
        state.items = items;
        state.last_error = None;

        if let Some(id) = state.selected_id {
            if !state.contains(id) {
                tracing::info!(%id, "Selected payment method no longer listed");
                state.selected_id = None;
            }
        }

        if state.is_adding() && state.ensure_capacity().is_err() {
            tracing::info!(items = state.items.len(), "Payment methods at capacity, closing add form");
            state.mode = AddMode::Idle;
        }

        tracing::debug!(items = state.items.len(), "Payment methods loaded");
    }

    fn select(state: &mut SelectionState, id: PaymentMethodId) {
        if state.contains(id) {
            tracing::debug!(%id, "Payment method selected");
            state.selected_id = Some(id);
            state.last_error = None;
        } else {
            tracing::warn!(%id, "Ignoring selection of unknown payment method");
            state.last_error = Some(SelectionError::UnknownPaymentMethod(id));
        }
    }

    fn begin_add(state: &mut SelectionState) {
        if state.is_adding() {
            tracing::trace!("Add form already open");
            return;
        }

        if let Err(error) = state.ensure_capacity() {
            tracing::warn!(%error, "Refusing to open add form");
            return;
        }

        tracing::debug!("Add form opened");
        state.mode = AddMode::open();
    }

    fn submit_card(
        state: &mut SelectionState,
        details: &CardDetails,
        env: &SelectionEnvironment,
    ) -> SmallVec<[Effect<SelectionAction>; 4]> {
        let AddMode::Adding { saving, errors } = &mut state.mode else {
            tracing::warn!("Card submitted with add form closed");
            state.last_error = Some(SelectionError::NotAdding);
            return SmallVec::new();
        };

        if *saving {
            tracing::warn!("Card save already in flight, ignoring submit");
            return SmallVec::new();
        }

        let card = match details.validate() {
            Ok(card) => card,
            Err(invalid) => {
                tracing::debug!(fields = invalid.len(), "Card details invalid");
                *errors = invalid;
                return SmallVec::new();
            },
        };

        *saving = true;
        errors.clear();
        state.last_error = None;
        tracing::info!(last_four = card.last_four(), card_type = %card.card_type, "Saving card");

        let gateway = Arc::clone(&env.gateway);
        smallvec![Effect::future(async move {
            match gateway.add_card(card).await {
                Ok(item) => Some(SelectionAction::CompleteAdd { item }),
                Err(error) => Some(SelectionAction::AddFailed { error }),
            }
        })]
    }

    fn complete_add(state: &mut SelectionState, item: PaymentMethod) {
        // Only the save that is still pending may close the form
        if !state.is_saving() {
            tracing::warn!(id = %item.id, "Card result arrived with no save pending");
            state.last_error = Some(SelectionError::NotAdding);
            return;
        }

        if state.contains(item.id) {
            tracing::trace!(id = %item.id, "Payment method already listed");
        } else {
            tracing::info!(id = %item.id, last_four = %item.last_four, "Payment method added");
            state.items.push(item);
        }

        state.mode = AddMode::Idle;
        state.last_error = None;
    }

    fn add_failed(state: &mut SelectionState, error: GatewayError) {
        tracing::info!(%error, "Card save failed");
        if let AddMode::Adding { saving, .. } = &mut state.mode {
            *saving = false;
        }
        state.last_error = Some(error.into());
    }
}

impl Reducer for SelectionReducer {
    type State = SelectionState;
    type Action = SelectionAction;
    type Environment = SelectionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SelectionAction::Load => {
                state.loading = true;
                let source = Arc::clone(&env.source);
                return smallvec![Effect::future(async move {
                    match source.list().await {
                        Ok(items) => Some(SelectionAction::Loaded { items }),
                        Err(error) => Some(SelectionAction::LoadFailed { error }),
                    }
                })];
            },

            SelectionAction::Loaded { items } => Self::loaded(state, items),

            SelectionAction::LoadFailed { error } => {
                tracing::warn!(%error, "Could not list payment methods");
                state.loading = false;
                state.last_error = Some(error.into());
            },

            SelectionAction::Select { id } => Self::select(state, id),

            SelectionAction::BeginAdd => Self::begin_add(state),

            SelectionAction::CancelAdd => {
                if state.is_saving() {
                    tracing::info!("Add form closed with a card save in flight");
                }
                state.mode = AddMode::Idle;
            },

            SelectionAction::SubmitCard { details } => {
                return Self::submit_card(state, &details, env);
            },

            SelectionAction::CompleteAdd { item } => Self::complete_add(state, item),

            SelectionAction::AddFailed { error } => Self::add_failed(state, error),
        }

        SmallVec::new()
    }
}
