//! Storefront Engine
//!
//! The storefront engine is the provider-agnostic core of the storefront builder's checkout. It turns a cart and a
//! shipping address into a settled order, either paid online through a payment gateway or committed as
//! cash-on-delivery, and decides whether a merchant delivers to a given address at all.
//!
//! The library is divided into these sections:
//! 1. Database management ([`mod@traits`] and the SQLite backend). Backends implement [`BusinessManagement`] and
//!    [`StorefrontDatabase`]. The data types stored in the database live in [`mod@db_types`] and are public.
//! 2. The public API, re-exported at the crate root. [`CheckoutApi`] holds the server-side operations (remote order
//!    creation, payment completion, cash orders and deliverability checks). [`CheckoutFlow`] is the client-side state
//!    machine that drives them.
//! 3. Events ([`mod@events`]). An order that gets paid, or a cash order that gets committed, emits an event that
//!    integrations can hook into, e.g. to message the merchant.
//!
//! External collaborators (the payment gateway and the geocoder) are reached through the [`PaymentGateway`] and
//! [`Geocoder`] traits, so the engine never talks HTTP itself.

pub mod db_types;
pub mod events;
pub mod helpers;
mod sfe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sfe_api::{
    checkout_api::{CheckoutApi, DEFAULT_REUSE_WINDOW_MINUTES},
    checkout_flow::{
        CheckoutBackend,
        CheckoutFlow,
        CheckoutFlowError,
        CheckoutSession,
        CheckoutState,
        DismissOutcome,
        InMemorySessionStore,
        PaymentSheet,
        PaymentSheetOutcome,
        SessionStore,
    },
    checkout_objects,
    delivery::{local_deliverability, Deliverability, DeliveryZoneMatcher, ShippingAddress, LOCATION_NOT_FOUND},
    errors::CheckoutApiError,
    intent::{build_intent, OrderIntent, PLATFORM_FEE_PERCENT},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{BusinessManagement, Geocoder, PaymentGateway, StoreError, StorefrontDatabase};
