//! Payment-method collaborators.
//!
//! Stored cards are owned by the payment service. The selection panel reads
//! them through [`PaymentMethodSource`] and creates new ones through
//! [`PaymentMethodGateway`]; it never edits a stored card.

use crate::card::NewCard;
use crate::types::{PaymentMethod, PaymentMethodId};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Payment service failure
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    /// The card was refused
    #[error("Card declined: {reason}")]
    CardDeclined {
        /// Decline reason
        reason: String,
    },

    /// The payment service could not be reached
    #[error("Payment service unavailable")]
    Unavailable,

    /// Other error
    #[error("Payment error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Read access to the customer's stored payment methods
pub trait PaymentMethodSource: Send + Sync {
    /// Current stored payment methods, in display order
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be fetched
    fn list(&self) -> Pin<Box<dyn Future<Output = GatewayResult<Vec<PaymentMethod>>> + Send>>;
}

/// Creates stored payment methods from validated card details
pub trait PaymentMethodGateway: Send + Sync {
    /// Store a new card
    ///
    /// # Errors
    ///
    /// Returns error if the card is refused
    fn add_card(&self, card: NewCard)
        -> Pin<Box<dyn Future<Output = GatewayResult<PaymentMethod>> + Send>>;
}

#[derive(Debug, Default)]
struct Wallet {
    methods: Vec<PaymentMethod>,
    next_id: u64,
    decline_next: Option<String>,
}

/// In-memory payment service acting as both source and gateway
///
/// Clones share the same wallet.
#[derive(Clone, Debug, Default)]
pub struct InMemoryWallet {
    wallet: Arc<Mutex<Wallet>>,
}

impl InMemoryWallet {
    /// Creates an empty wallet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a wallet holding the given cards
    #[must_use]
    pub fn with_methods(methods: Vec<PaymentMethod>) -> Self {
        let next_id = methods.iter().map(|m| m.id.value()).max().unwrap_or(0);
        Self {
            wallet: Arc::new(Mutex::new(Wallet {
                methods,
                next_id,
                decline_next: None,
            })),
        }
    }

    /// Two stored visa cards, as seeded in development
    #[must_use]
    pub fn sample() -> Self {
        Self::with_methods(vec![
            PaymentMethod {
                id: PaymentMethodId::new(1),
                card_type: crate::types::CardType::Visa,
                last_four: "1111".to_string(),
                card_name: "bob".to_string(),
                exp: "01/28".to_string(),
            },
            PaymentMethod {
                id: PaymentMethodId::new(2),
                card_type: crate::types::CardType::Visa,
                last_four: "1111".to_string(),
                card_name: "bob".to_string(),
                exp: "01/28".to_string(),
            },
        ])
    }

    /// Makes the next `add_card` call fail with a decline
    pub fn decline_next(&self, reason: impl Into<String>) {
        self.lock().decline_next = Some(reason.into());
    }

    /// Cards currently stored
    #[must_use]
    pub fn methods(&self) -> Vec<PaymentMethod> {
        self.lock().methods.clone()
    }

    /// Shares this wallet as a source
    #[must_use]
    pub fn source(&self) -> Arc<dyn PaymentMethodSource> {
        Arc::new(self.clone())
    }

    /// Shares this wallet as a gateway
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn PaymentMethodGateway> {
        Arc::new(self.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Wallet> {
        self.wallet.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PaymentMethodSource for InMemoryWallet {
    fn list(&self) -> Pin<Box<dyn Future<Output = GatewayResult<Vec<PaymentMethod>>> + Send>> {
        let methods = self.methods();
        Box::pin(async move { Ok(methods) })
    }
}

impl PaymentMethodGateway for InMemoryWallet {
    fn add_card(
        &self,
        card: NewCard,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentMethod>> + Send>> {
        let wallet = self.clone();
        Box::pin(async move {
            let mut inner = wallet.lock();

            if let Some(reason) = inner.decline_next.take() {
                tracing::info!(last_four = card.last_four(), %reason, "Mock wallet declined card");
                return Err(GatewayError::CardDeclined { reason });
            }

            inner.next_id += 1;
            let method = PaymentMethod {
                id: PaymentMethodId::new(inner.next_id),
                card_type: card.card_type,
                last_four: card.last_four().to_string(),
                card_name: card.card_name,
                exp: card.exp,
            };
            inner.methods.push(method.clone());

            tracing::info!(id = %method.id, last_four = %method.last_four, "Mock wallet stored card");
            Ok(method)
        })
    }
}
