use std::sync::Arc;

use log::*;
use reqwest::Client;

use crate::{config::NotifierConfig, data_objects::MerchantMessage, NotifierError};

/// Fire-and-forget messages to merchants.
///
/// Without a configured webhook the notifier degrades to writing the message to the log.
#[derive(Clone)]
pub struct MerchantNotifier {
    config: NotifierConfig,
    client: Arc<Client>,
}

impl MerchantNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifierError> {
        let client = Client::builder().build().map_err(|e| NotifierError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn is_configured(&self) -> bool {
        self.config.url.is_some()
    }

    pub async fn send(&self, message: &MerchantMessage) -> Result<(), NotifierError> {
        let Some(url) = self.config.url.as_ref() else {
            info!("📨️ [log only] To {}: {}", message.to, message.text);
            return Ok(());
        };
        let mut req = self.client.post(url).json(message);
        if !self.config.token.is_empty() {
            req = req.bearer_auth(self.config.token.reveal());
        }
        let response = req.send().await.map_err(|e| NotifierError::DeliveryFailed(e.to_string()))?;
        if response.status().is_success() {
            debug!("📨️ Message delivered to {}", message.to);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(NotifierError::Rejected { status, message })
        }
    }
}
