use gateway_tools::{GeocoderConfig, NominatimGeocoder, NominatimPlace};
use storefront_engine::traits::{GeoPlace, Geocoder, LookupFailed};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct GeocoderClient {
    geocoder: NominatimGeocoder,
}

impl GeocoderClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, ServerError> {
        let geocoder = NominatimGeocoder::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { geocoder })
    }
}

fn to_geo_place(place: NominatimPlace) -> GeoPlace {
    let a = place.address;
    GeoPlace {
        display_name: place.display_name,
        city: a.city,
        town: a.town,
        village: a.village,
        suburb: a.suburb,
        district: a.city_district.or(a.state_district),
        county: a.county,
        state: a.state,
        postal_code: a.postcode,
    }
}

impl Geocoder for GeocoderClient {
    async fn lookup(&self, address: &str) -> Result<Vec<GeoPlace>, LookupFailed> {
        let places = self.geocoder.search(address).await.map_err(|e| LookupFailed(e.to_string()))?;
        Ok(places.into_iter().map(to_geo_place).collect())
    }
}
