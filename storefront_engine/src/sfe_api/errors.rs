use thiserror::Error;

use crate::{sfe_api::checkout_objects::ValidationErrors, traits::StoreError};

#[derive(Debug, Clone, Error)]
pub enum CheckoutApiError {
    #[error("Invalid customer details. {0}")]
    InvalidAddress(ValidationErrors),
    #[error("Invalid order amount. {0}")]
    InvalidAmount(String),
    #[error("Delivery is not available at this address. {reason}")]
    DeliveryIneligible { reason: String, suggestions: Vec<String> },
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("Online payments are not configured for this business")]
    GatewayNotConfigured,
    #[error("The payment signature is invalid")]
    SignatureInvalid,
    #[error("No business found for '{0}'")]
    BusinessNotFound(String),
    #[error("Order {0} not found")]
    OrderNotFound(String),
    #[error("Payment processing. Please contact support. {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for CheckoutApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(id) => CheckoutApiError::OrderNotFound(id.as_str().to_string()),
            e => CheckoutApiError::PersistenceFailure(e.to_string()),
        }
    }
}
