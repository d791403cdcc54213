use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use sfb_common::Secret;

use crate::{
    config::GatewayApiConfig,
    data_objects::{GatewayOrder, GatewayOrderRequest},
    GatewayApiError,
};

/// REST client for a Razorpay-compatible payment gateway.
///
/// Every merchant has their own gateway account, so credentials are supplied per call rather than at construction.
#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayApiConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayApiConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        key_id: &str,
        key_secret: &Secret<String>,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("Sending gateway query: {url}");
        let mut req = self.client.request(method, url).basic_auth(key_id, Some(key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::Unreachable(e.to_string()))?;
        if response.status().is_success() {
            trace!("Gateway query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::Unreachable(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Registers a new order with the gateway. The returned id is what the hosted payment sheet is opened with.
    pub async fn create_order(
        &self,
        key_id: &str,
        key_secret: &Secret<String>,
        request: GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayApiError> {
        debug!("Registering gateway order for receipt {} ({} {})", request.receipt, request.amount, request.currency);
        let order =
            self.rest_query::<GatewayOrder, GatewayOrderRequest>(Method::POST, "/orders", key_id, key_secret, Some(request))
                .await?;
        info!("Gateway order {} created for receipt {}", order.id, order.receipt.as_deref().unwrap_or("-"));
        Ok(order)
    }

    pub async fn fetch_order(
        &self,
        key_id: &str,
        key_secret: &Secret<String>,
        gateway_order_id: &str,
    ) -> Result<GatewayOrder, GatewayApiError> {
        let path = format!("/orders/{gateway_order_id}");
        self.rest_query::<GatewayOrder, ()>(Method::GET, &path, key_id, key_secret, None).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_urls() {
        let api = GatewayApi::new(GatewayApiConfig { api_url: "https://gw.example.com/v1".into() }).unwrap();
        assert_eq!(api.url("/orders"), "https://gw.example.com/v1/orders");
        assert_eq!(api.url("/orders/order_1"), "https://gw.example.com/v1/orders/order_1");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_reported() {
        let api = GatewayApi::new(GatewayApiConfig { api_url: "http://127.0.0.1:9".into() }).unwrap();
        let request = GatewayOrderRequest { amount: 100, currency: "INR".into(), receipt: "r1".into() };
        let err = api.create_order("key", &Secret::new("secret".into()), request).await.unwrap_err();
        assert!(matches!(err, GatewayApiError::Unreachable(_)));
    }
}
