use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The geocoding service could not be reached: {0}")]
    Unreachable(String),
    #[error("Geocoding request failed with status {0}")]
    QueryError(u16),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not deliver message: {0}")]
    DeliveryFailed(String),
    #[error("Messaging service rejected the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}
