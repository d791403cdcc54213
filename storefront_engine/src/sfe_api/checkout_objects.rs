use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sfb_common::Paise;

use crate::db_types::{CartLineItem, CustomerDetails, OrderId};

/// What a checkout entry point received: a single product ("buy now") or the whole cart ("checkout all").
///
/// Both shapes normalise to the same list of line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckoutItems {
    BuyNow { item: CartLineItem },
    Cart { items: Vec<CartLineItem> },
}

impl CheckoutItems {
    pub fn into_line_items(self) -> Vec<CartLineItem> {
        match self {
            CheckoutItems::BuyNow { item } => vec![item],
            CheckoutItems::Cart { items } => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub items: CheckoutItems,
    pub customer: CustomerDetails,
}

/// How the total splits between the platform and the merchant. `seller_amount + platform_fee == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub total: Paise,
    pub platform_fee: Paise,
    pub seller_amount: Paise,
}

/// Everything the buyer's client needs to open the gateway's payment sheet. Contains no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub gateway_order_id: String,
    /// The merchant's public gateway key id
    pub gateway_public_key: String,
    /// The amount registered with the gateway, in paise
    pub amount: Paise,
    pub currency: String,
    pub internal_order_id: OrderId,
    pub breakdown: PriceBreakdown,
    pub business_name: String,
    /// True if an identical, still-pending attempt was found and its gateway order is being handed out again
    #[serde(default)]
    pub reused: bool,
}

/// The triple the payment sheet hands back after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCompletion {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

//--------------------------------------      Validation       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<S: Into<String>>(field: S, message: S) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Field-level validation failures for customer details, so that a form can highlight each offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push<S: Into<String>>(&mut self, field: S, message: S) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msgs = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<String>>();
        write!(f, "{}", msgs.join("; "))
    }
}
