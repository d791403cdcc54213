use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sfb_common::Paise;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

pub const PAYMENT_CAPTURED_EVENT: &str = "payment.captured";

/// A payment gateway webhook notification. Only the fields the server acts on are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayWebhook {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<PaymentEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEnvelope {
    pub entity: PaymentEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    /// The gateway's payment id
    pub id: String,
    /// The gateway order the payment was made against
    pub order_id: Option<String>,
    pub amount: Paise,
    pub currency: String,
    #[serde(default)]
    pub status: String,
}

impl GatewayWebhook {
    /// The captured payment carried by a `payment.captured` event, if this is one.
    pub fn captured_payment(&self) -> Option<&PaymentEntity> {
        if self.event != PAYMENT_CAPTURED_EVENT {
            return None;
        }
        self.payload.payment.as_ref().map(|p| &p.entity)
    }
}
