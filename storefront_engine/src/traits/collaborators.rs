use serde::{Deserialize, Serialize};
use sfb_common::Paise;
use thiserror::Error;

use crate::db_types::{GatewayCredentials, OrderId};

//--------------------------------------    Payment gateway    ---------------------------------------------------------
/// An order as registered with the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGatewayOrder {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// Registers orders with a merchant's payment gateway account.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Registers `amount` (the full payer-facing total) with the gateway. `receipt` is the platform's own order id and
    /// is echoed back by the gateway.
    async fn create_order(
        &self,
        credentials: &GatewayCredentials,
        amount: Paise,
        currency: &str,
        receipt: &OrderId,
    ) -> Result<RemoteGatewayOrder, GatewayError>;
}

//--------------------------------------       Geocoder        ---------------------------------------------------------
/// A geocoded candidate for a free-text address. Every field is optional; providers fill in what they know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPlace {
    pub display_name: String,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub district: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl GeoPlace {
    /// The structured locality fields a delivery zone can match against.
    pub fn locality_fields(&self) -> impl Iterator<Item = &str> {
        [&self.city, &self.town, &self.village, &self.suburb, &self.district, &self.county, &self.postal_code]
            .into_iter()
            .filter_map(|f| f.as_deref())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Location lookup failed: {0}")]
pub struct LookupFailed(pub String);

/// Resolves free-text addresses into ranked candidate places, best first.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn lookup(&self, address: &str) -> Result<Vec<GeoPlace>, LookupFailed>;
}
