//! # Storefront engine public API
//!
//! The `sfe_api` module exposes the programmatic API for the storefront checkout.
//!
//! * [`checkout_api`] is the server side of checkout. It creates gateway orders, reconciles payment completions,
//!   commits cash-on-delivery orders and answers deliverability questions.
//! * [`checkout_flow`] is the buyer-side state machine that walks a cart from address entry to a placed order.
//! * [`delivery`] decides whether an address falls inside a merchant's delivery area.
//! * [`intent`] validates buyer details and prices a cart, including the platform fee split.
//!
//! The other submodules are the request and response types, and the errors the API returns.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend plus the external collaborators it needs.
//!
//! ```rust,ignore
//! use storefront_engine::{CheckoutApi, DeliveryZoneMatcher, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, gateway, DeliveryZoneMatcher::Geocoded(geocoder), producers);
//! let remote = api.create_remote_order("chai-point", items, customer).await?;
//! ```

pub mod checkout_api;
pub mod checkout_flow;
pub mod checkout_objects;
pub mod delivery;
pub mod errors;
pub mod intent;
