//! Shared value types for the storefront editors.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A calendar day (year, month, day) with no time or offset attached
///
/// Show dates are grouped by calendar day. Two picker instants that fall on
/// the same day in their own offset map to the same `CalendarDate`, however
/// far apart the instants are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Wraps a `NaiveDate`
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a date from its components, `None` if they don't form a real day
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The calendar day an instant falls on, read in the instant's own offset
    #[must_use]
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    /// Returns the inner `NaiveDate`
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Identifier of a stored payment method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(u64);

impl PaymentMethodId {
    /// Creates a `PaymentMethodId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card networks accepted by the storefront
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Visa
    Visa,
    /// Mastercard
    Mastercard,
    /// Discover
    Discover,
    /// American Express
    Amex,
}

impl CardType {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Discover => "discover",
            Self::Amex => "amex",
        }
    }
}

impl FromStr for CardType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "discover" => Ok(Self::Discover),
            "amex" => Ok(Self::Amex),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored payment method, as listed by the payment-method source
///
/// Owned by the payment service. Editors only ever select among these by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Stable identifier
    pub id: PaymentMethodId,
    /// Card network
    pub card_type: CardType,
    /// Last four digits of the card number
    pub last_four: String,
    /// Name on the card
    pub card_name: String,
    /// Expiry as `MM/YY`
    pub exp: String,
}
