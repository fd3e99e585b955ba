//! Errors surfaced by the storefront editors.
//!
//! Reducers never return these; they record the latest one in state so the
//! hosting layer can show it.

use crate::fields::FieldErrors;
use crate::payment_methods::GatewayError;
use crate::sink::SubmissionError;
use crate::types::PaymentMethodId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a movie submission did not go through
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SubmitError {
    /// One or more scalar fields are invalid
    #[error("Please correct the highlighted fields: {0}")]
    InvalidFields(FieldErrors),

    /// The roster is empty
    #[error("Please add at least one cast member.")]
    MissingCast,

    /// The schedule is empty
    #[error("Please add at least one show date and time.")]
    MissingSchedule,

    /// The catalog did not accept the movie
    #[error("Failed to add movie: {0}")]
    Rejected(#[from] SubmissionError),
}

/// Why a payment-method action was refused
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionError {
    /// Selected id is not among the listed methods
    #[error("Payment method {0} not found")]
    UnknownPaymentMethod(PaymentMethodId),

    /// The wallet already holds the maximum number of cards
    #[error("At most {capacity} payment methods can be stored")]
    CapacityReached {
        /// Capacity bound
        capacity: usize,
    },

    /// A card result arrived with no add in progress
    #[error("No payment method is being added")]
    NotAdding,

    /// The payment service failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
