//! # Gateway tools
//!
//! Thin, provider-specific HTTP clients for the external collaborators of the storefront checkout pipeline:
//!
//! * [`GatewayApi`] registers orders with a Razorpay-compatible payment gateway.
//! * [`NominatimGeocoder`] resolves free-text shipping addresses into structured places.
//! * [`MerchantNotifier`] delivers best-effort text messages to merchants through a messaging webhook.
//!
//! None of these types know anything about orders or businesses. The server glues them to the engine's traits.
mod api;
mod config;
mod data_objects;
mod error;
mod geocoder;
mod notifier;

pub use api::GatewayApi;
pub use config::{GatewayApiConfig, GeocoderConfig, NotifierConfig};
pub use data_objects::{GatewayOrder, GatewayOrderRequest, MerchantMessage, NominatimAddress, NominatimPlace};
pub use error::{GatewayApiError, GeocodeError, NotifierError};
pub use geocoder::NominatimGeocoder;
pub use notifier::MerchantNotifier;
