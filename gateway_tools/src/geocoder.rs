use std::sync::Arc;

use log::*;
use reqwest::{header::HeaderValue, Client};

use crate::{config::GeocoderConfig, data_objects::NominatimPlace, GeocodeError};

/// Free-text address search against a Nominatim instance.
#[derive(Clone)]
pub struct NominatimGeocoder {
    config: GeocoderConfig,
    client: Arc<Client>,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| GeocodeError::Initialization(e.to_string()))?;
        let client =
            Client::builder().user_agent(user_agent).build().map_err(|e| GeocodeError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.config.url)
    }

    /// Returns candidate places, best match first. An empty list is a normal outcome.
    pub async fn search(&self, address: &str) -> Result<Vec<NominatimPlace>, GeocodeError> {
        let limit = self.config.max_results.to_string();
        let params = [("q", address), ("format", "jsonv2"), ("addressdetails", "1"), ("limit", limit.as_str())];
        trace!("🗺️ Geocoding '{address}'");
        let response = self
            .client
            .get(self.search_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| GeocodeError::Unreachable(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("🗺️ Geocoder returned status {status} for '{address}'");
            return Err(GeocodeError::QueryError(status));
        }
        let places =
            response.json::<Vec<NominatimPlace>>().await.map_err(|e| GeocodeError::JsonError(e.to_string()))?;
        debug!("🗺️ Geocoder returned {} candidates for '{address}'", places.len());
        Ok(places)
    }
}
