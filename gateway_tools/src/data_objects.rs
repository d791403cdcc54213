use serde::{Deserialize, Serialize};

//--------------------------------------   Payment gateway   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    /// Amount in the currency's minor unit
    pub amount: i64,
    pub currency: String,
    /// Our own order id. The gateway echoes it back and shows it on its dashboard.
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

//--------------------------------------       Geocoder      ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NominatimPlace {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: NominatimAddress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub city_district: Option<String>,
    pub state_district: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

//--------------------------------------      Messaging      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantMessage {
    /// The merchant's phone number (or channel handle) the message is addressed to
    pub to: String,
    pub text: String,
}
