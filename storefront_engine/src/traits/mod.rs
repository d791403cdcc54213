//! # Backend and collaborator contracts
//!
//! This module defines the interface contracts the storefront engine relies on. Nothing in here knows about SQLite or
//! HTTP.
//!
//! ## Storage
//! * [`BusinessManagement`] provides read access to the business store (merchants, their delivery area and gateway
//!   credentials) and to the orders placed with them.
//! * [`StorefrontDatabase`] defines the order ledger writes the checkout pipeline performs. The key guarantee is that
//!   [`StorefrontDatabase::mark_order_paid`] is a single atomic conditional update, so concurrent duplicate payment
//!   callbacks settle an order exactly once.
//!
//! ## Collaborators
//! * [`PaymentGateway`] registers orders with the merchant's payment gateway account.
//! * [`Geocoder`] resolves a free-text address into ranked, structured places.
mod business_management;
mod collaborators;
mod storefront_database;

pub use business_management::BusinessManagement;
pub use collaborators::{GatewayError, GeoPlace, Geocoder, LookupFailed, PaymentGateway, RemoteGatewayOrder};
pub use storefront_database::{StoreError, StorefrontDatabase};
