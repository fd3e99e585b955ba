//! Card details typed into the add-payment-method form.

use crate::types::CardType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{13,19}$").expect("card number pattern is valid"));

#[allow(clippy::expect_used)]
static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/(\d{2})$").expect("expiry pattern is valid")
});

#[allow(clippy::expect_used)]
static CVV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("cvv pattern is valid"));

/// Inputs of the card form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    /// Card number
    CardNumber,
    /// Name on the card
    CardName,
    /// Expiry
    Exp,
    /// Security code
    Cvv,
    /// Billing address
    Address,
    /// Card network
    CardType,
}

/// Validation failure for a single card field
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardError {
    /// Number is not 13 to 19 digits
    #[error("Card number must be between 13 and 19 digits")]
    CardNumber,

    /// Cardholder name missing
    #[error("Name is required")]
    NameRequired,

    /// Expiry not `MM/YY` with a real month
    #[error("Invalid expiration date. Format as MM/YY")]
    Expiry,

    /// CVV is not 3 or 4 digits
    #[error("CVV must be 3-4 digits")]
    Cvv,

    /// Billing address missing
    #[error("Address is required")]
    AddressRequired,

    /// Card type not picked, or not one we accept
    #[error("Card type must be one of visa, mastercard, discover, amex")]
    CardType,
}

/// Per-field card errors
pub type CardErrors = BTreeMap<CardField, CardError>;

/// Raw card form input, as typed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Card number, digits only
    pub card_number: String,
    /// Name on the card
    pub card_name: String,
    /// Expiry as `MM/YY`
    pub exp: String,
    /// Security code
    pub cvv: String,
    /// Billing address
    pub address: String,
    /// Card network wire name (`visa`, `mastercard`, ...)
    pub card_type: String,
}

/// Card details that passed validation, ready for the gateway
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    /// Card number
    pub card_number: String,
    /// Name on the card
    pub card_name: String,
    /// Expiry as `MM/YY`
    pub exp: String,
    /// Security code
    pub cvv: String,
    /// Billing address
    pub address: String,
    /// Card network
    pub card_type: CardType,
}

impl NewCard {
    /// Last four digits of the number
    #[must_use]
    pub fn last_four(&self) -> &str {
        let start = self
            .card_number
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(index, _)| index);
        &self.card_number[start..]
    }
}

// Keeps the number and CVV out of logs
impl std::fmt::Debug for NewCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCard")
            .field("last_four", &self.last_four())
            .field("card_name", &self.card_name)
            .field("exp", &self.exp)
            .field("card_type", &self.card_type)
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    /// Validates every field, collecting all failures at once
    ///
    /// # Errors
    ///
    /// Returns one [`CardError`] per failing field.
    pub fn validate(&self) -> Result<NewCard, CardErrors> {
        let mut errors = CardErrors::new();

        let card_number = self.card_number.trim();
        if !CARD_NUMBER.is_match(card_number) {
            errors.insert(CardField::CardNumber, CardError::CardNumber);
        }

        let card_name = self.card_name.trim();
        if card_name.is_empty() {
            errors.insert(CardField::CardName, CardError::NameRequired);
        }

        let exp = self.exp.trim();
        if !EXPIRY.is_match(exp) {
            errors.insert(CardField::Exp, CardError::Expiry);
        }

        let cvv = self.cvv.trim();
        if !CVV.is_match(cvv) {
            errors.insert(CardField::Cvv, CardError::Cvv);
        }

        let address = self.address.trim();
        if address.is_empty() {
            errors.insert(CardField::Address, CardError::AddressRequired);
        }

        let card_type = self.card_type.trim().parse::<CardType>().ok();
        if card_type.is_none() {
            errors.insert(CardField::CardType, CardError::CardType);
        }

        match card_type {
            Some(card_type) if errors.is_empty() => Ok(NewCard {
                card_number: card_number.to_string(),
                card_name: card_name.to_string(),
                exp: exp.to_string(),
                cvv: cvv.to_string(),
                address: address.to_string(),
                card_type,
            }),
            _ => Err(errors),
        }
    }
}
