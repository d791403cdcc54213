use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use serde_json::json;
use storefront_engine::CheckoutApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error(transparent)]
    Checkout(#[from] CheckoutApiError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(e) => match e {
                CheckoutApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                CheckoutApiError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                CheckoutApiError::DeliveryIneligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutApiError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
                CheckoutApiError::GatewayNotConfigured => StatusCode::CONFLICT,
                CheckoutApiError::SignatureInvalid => StatusCode::BAD_REQUEST,
                CheckoutApiError::BusinessNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutApiError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutApiError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Checkout(CheckoutApiError::InvalidAddress(errors)) => {
                json!({ "error": self.to_string(), "fields": errors.0 })
            },
            Self::Checkout(CheckoutApiError::DeliveryIneligible { suggestions, .. }) => {
                json!({ "error": self.to_string(), "suggestions": suggestions })
            },
            Self::Checkout(CheckoutApiError::PersistenceFailure(detail)) => {
                error!("💻️ Payment could not be recorded. {detail}");
                json!({ "error": "Payment processing. Please contact support." })
            },
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
