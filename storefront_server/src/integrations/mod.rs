//! Glue between the engine's collaborator traits and the concrete HTTP clients in `gateway_tools`.
mod gateway;
mod geocoding;
mod notifications;

pub use gateway::GatewayClient;
pub use geocoding::GeocoderClient;
pub use notifications::{cash_order_message, create_notification_handlers, order_paid_message};
