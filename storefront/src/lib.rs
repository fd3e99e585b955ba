//! # Marquee Storefront
//!
//! Editors behind the movie storefront's admin console and checkout page,
//! built as Marquee reducers:
//!
//! - [`roster`]: duplicate-free cast list
//! - [`schedule`]: show dates grouped by calendar day, each with its times
//! - [`selection`]: single payment-method selection with a bounded add flow
//! - [`movie_form`]: validated movie entry composing the two collection editors
//!
//! External services sit behind traits injected through each reducer's
//! environment: [`sink::SubmissionSink`] for the catalog and
//! [`payment_methods::PaymentMethodSource`] /
//! [`payment_methods::PaymentMethodGateway`] for stored cards. In-memory
//! implementations live next to each trait.

pub mod card;
pub mod config;
pub mod error;
pub mod fields;
pub mod movie_form;
pub mod payload;
pub mod payment_methods;
pub mod roster;
pub mod schedule;
pub mod selection;
pub mod sink;
pub mod types;

pub use config::Config;
pub use error::{SelectionError, SubmitError};
pub use movie_form::{MovieFormAction, MovieFormEnvironment, MovieFormReducer, MovieFormState};
pub use roster::{RosterAction, RosterReducer, RosterState};
pub use schedule::{ScheduleAction, ScheduleGroup, ScheduleReducer, ScheduleState};
pub use selection::{
    SelectionAction, SelectionEnvironment, SelectionReducer, SelectionState, PAYMENT_METHOD_CAPACITY,
};
pub use types::{CalendarDate, CardType, PaymentMethod, PaymentMethodId};
