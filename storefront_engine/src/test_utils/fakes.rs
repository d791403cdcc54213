//! In-memory stand-ins for the external collaborators, for tests that should not touch the network.
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
    Mutex,
};

use sfb_common::Paise;

use crate::{
    db_types::{GatewayCredentials, OrderId},
    traits::{GatewayError, GeoPlace, Geocoder, LookupFailed, PaymentGateway, RemoteGatewayOrder},
};

/// Hands out sequential gateway order ids (`order_fake_1`, `order_fake_2`, ...) and records every request.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    next_id: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<(String, Paise, OrderId)>>>,
}

impl FakeGateway {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// `(key_id, amount, receipt)` for every order registered so far.
    pub fn requests(&self) -> Vec<(String, Paise, OrderId)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        credentials: &GatewayCredentials,
        amount: Paise,
        currency: &str,
        receipt: &OrderId,
    ) -> Result<RemoteGatewayOrder, GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("connection refused".into()));
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((credentials.key_id.clone(), amount, receipt.clone()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteGatewayOrder { id: format!("order_fake_{n}"), amount, currency: currency.to_string() })
    }
}

/// Answers every lookup with the same candidates, or fails every lookup.
#[derive(Debug, Clone, Default)]
pub struct FakeGeocoder {
    places: Option<Vec<GeoPlace>>,
    lookups: Arc<AtomicU64>,
}

impl FakeGeocoder {
    pub fn returning(places: Vec<GeoPlace>) -> Self {
        Self { places: Some(places), lookups: Arc::default() }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    async fn lookup(&self, address: &str) -> Result<Vec<GeoPlace>, LookupFailed> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.places.clone().ok_or_else(|| LookupFailed(format!("no route to geocoder for '{address}'")))
    }
}
