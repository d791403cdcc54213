use gateway_tools::{GatewayApi, GatewayApiConfig, GatewayApiError, GatewayOrderRequest};
use log::*;
use sfb_common::Paise;
use storefront_engine::{
    db_types::{GatewayCredentials, OrderId},
    traits::{GatewayError, PaymentGateway, RemoteGatewayOrder},
};

use crate::errors::ServerError;

/// Registers orders with the gateway's REST API, using each merchant's own credentials.
#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn new(config: GatewayApiConfig) -> Result<Self, ServerError> {
        let api = GatewayApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn to_gateway_error(e: GatewayApiError) -> GatewayError {
    match e {
        GatewayApiError::QueryError { status, message } if (400..500).contains(&status) => {
            GatewayError::Rejected(format!("{status}: {message}"))
        },
        e => GatewayError::Unavailable(e.to_string()),
    }
}

impl PaymentGateway for GatewayClient {
    async fn create_order(
        &self,
        credentials: &GatewayCredentials,
        amount: Paise,
        currency: &str,
        receipt: &OrderId,
    ) -> Result<RemoteGatewayOrder, GatewayError> {
        let request =
            GatewayOrderRequest { amount: amount.value(), currency: currency.to_string(), receipt: receipt.as_str().to_string() };
        let order =
            self.api.create_order(&credentials.key_id, &credentials.key_secret, request).await.map_err(|e| {
                warn!("💳️ Gateway order for {receipt} failed. {e}");
                to_gateway_error(e)
            })?;
        if order.amount != amount.value() {
            warn!("💳️ Gateway registered {} for {receipt}, but {amount} was requested", order.amount);
        }
        Ok(RemoteGatewayOrder { id: order.id, amount: Paise::from(order.amount), currency: order.currency })
    }
}
