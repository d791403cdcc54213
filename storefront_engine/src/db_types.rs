use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sfb_common::Paise;
use sfb_common::{Secret, DEFAULT_CURRENCY_CODE};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------       Business        ---------------------------------------------------------
/// A merchant on the platform. Each business has its own microsite, identified by `slug`.
#[derive(Clone, FromRow, Serialize)]
pub struct Business {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Free-text zone descriptors. Numeric entries are postal-code fragments, the rest are locality names.
    /// An empty list means the business delivers everywhere.
    #[sqlx(json)]
    pub delivery_area: Vec<String>,
    pub gateway_key_id: Option<String>,
    #[serde(skip)]
    pub gateway_key_secret: Option<String>,
    /// Where merchant notifications are sent
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Business {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Business")
            .field("id", &self.id)
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("delivery_area", &self.delivery_area)
            .field("gateway_key_id", &self.gateway_key_id)
            .field("gateway_key_secret", &self.gateway_key_secret.as_ref().map(|_| "****"))
            .field("contact_phone", &self.contact_phone)
            .finish()
    }
}

impl Business {
    /// The merchant's gateway credentials, if both halves have been configured.
    pub fn gateway_credentials(&self) -> Option<GatewayCredentials> {
        let key_id = self.gateway_key_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key_secret = self.gateway_key_secret.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(GatewayCredentials { key_id: key_id.to_string(), key_secret: Secret::new(key_secret.to_string()) })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBusiness {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub delivery_area: Vec<String>,
    pub gateway_key_id: Option<String>,
    pub gateway_key_secret: Option<String>,
    pub contact_phone: Option<String>,
}

impl NewBusiness {
    pub fn new<S: Into<String>>(slug: S, name: S) -> Self {
        Self { slug: slug.into(), name: name.into(), ..Default::default() }
    }

    pub fn with_delivery_area<S: Into<String>>(mut self, zones: impl IntoIterator<Item = S>) -> Self {
        self.delivery_area = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_gateway_keys<S: Into<String>>(mut self, key_id: S, key_secret: S) -> Self {
        self.gateway_key_id = Some(key_id.into());
        self.gateway_key_secret = Some(key_secret.into());
        self
    }

    pub fn with_contact_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.contact_phone = Some(phone.into());
        self
    }
}

/// A merchant's account with the payment gateway. The `key_id` is public and is handed to the payment sheet; the
/// secret never leaves the server.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: Secret<String>,
}

//--------------------------------------     CartLineItem      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Paise,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLineItem {
    pub fn new<S: Into<String>>(product_id: S, name: S, unit_price: Paise, quantity: i64) -> Self {
        Self { product_id: product_id.into(), name: name.into(), unit_price, quantity, image: None }
    }
}

//--------------------------------------    CustomerDetails    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    #[serde(default)]
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// A gateway order has been (or is being) registered and the buyer has not completed payment yet.
    PendingPayment,
    /// The gateway confirmed payment with a valid signature. Terminal.
    Paid,
    /// Cash on delivery. The merchant collects payment on hand-over.
    PendingCash,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::PendingPayment => write!(f, "pending_payment"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::PendingCash => write!(f, "pending_cash"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "pending_cash" => Ok(Self::PendingCash),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    /// The status an order paid this way starts out in.
    pub fn initial_status(&self) -> OrderStatusType {
        match self {
            PaymentMethod::Online => OrderStatusType::PendingPayment,
            PaymentMethod::Cash => OrderStatusType::PendingCash,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online => write!(f, "online"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "cash" | "cod" => Ok(Self::Cash),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The platform's own order identifier. Also used as the gateway `receipt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn random() -> Self {
        Self(format!("ord_{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip)]
    pub id: i64,
    pub order_id: OrderId,
    #[serde(skip)]
    pub business_id: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub total_amount: Paise,
    pub platform_fee: Paise,
    pub seller_amount: Paise,
    pub currency: String,
    #[sqlx(json)]
    pub line_items: Vec<CartLineItem>,
    #[sqlx(json)]
    pub customer: CustomerDetails,
    #[serde(skip)]
    pub intent_fingerprint: Option<String>,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    #[serde(skip)]
    pub gateway_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatusType::Paid
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub business_id: i64,
    pub payment_method: PaymentMethod,
    pub total_amount: Paise,
    pub platform_fee: Paise,
    pub seller_amount: Paise,
    pub currency: String,
    pub line_items: Vec<CartLineItem>,
    pub customer: CustomerDetails,
    /// Identifies identical checkout attempts, so that a retry can reuse a pending gateway order.
    pub intent_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(business_id: i64, payment_method: PaymentMethod, total_amount: Paise) -> Self {
        Self {
            order_id: OrderId::random(),
            business_id,
            payment_method,
            total_amount,
            platform_fee: Paise::default(),
            seller_amount: total_amount,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            line_items: Vec::new(),
            customer: CustomerDetails::default(),
            intent_fingerprint: None,
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> OrderStatusType {
        self.payment_method.initial_status()
    }
}

//--------------------------------------    PaidTransition     ---------------------------------------------------------
/// The result of asking the backend to mark an order as paid.
#[derive(Debug, Clone)]
pub struct PaidTransition {
    pub order: Order,
    /// `false` when the order had already been paid by an earlier callback and nothing was written.
    pub newly_paid: bool,
}
