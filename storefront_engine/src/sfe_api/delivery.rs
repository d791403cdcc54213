//! Delivery zone matching.
//!
//! A business describes where it delivers with a list of free-text zones, e.g. `["400001", "Andheri", "Thane"]`.
//! Numeric zones are postal-code fragments and everything else is a locality name. An empty list means the business
//! delivers everywhere.
//!
//! There are two interchangeable strategies behind [`DeliveryZoneMatcher`]:
//! * [`DeliveryZoneMatcher::Geocoded`] asks a [`Geocoder`] to resolve the address and matches zones against the
//!   structured locality fields of the best candidate.
//! * [`DeliveryZoneMatcher::LocalHeuristic`] does substring matching on the address text. It needs no I/O, which makes
//!   it suitable for instant feedback while the buyer is still typing.
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::CustomerDetails,
    traits::{GeoPlace, Geocoder},
};

pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const OUTSIDE_DELIVERY_AREA: &str = "Outside delivery area";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverability {
    pub deliverable: bool,
    /// The zones (as the merchant wrote them) that matched the address
    pub matched_zones: Vec<String>,
    pub reason: Option<String>,
}

impl Deliverability {
    pub fn unrestricted() -> Self {
        Self { deliverable: true, matched_zones: vec![], reason: None }
    }

    pub fn not_deliverable(reason: &str) -> Self {
        Self { deliverable: false, matched_zones: vec![], reason: Some(reason.to_string()) }
    }

    fn from_matches(matched_zones: Vec<String>) -> Self {
        if matched_zones.is_empty() {
            Self::not_deliverable(OUTSIDE_DELIVERY_AREA)
        } else {
            Self { deliverable: true, matched_zones, reason: None }
        }
    }
}

/// The parts of a customer's details that say where they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

impl ShippingAddress {
    /// A single-line form of the address, suitable for free-text geocoding.
    pub fn one_line(&self) -> String {
        [&self.address, &self.city, &self.state, &self.postal_code]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

impl From<&CustomerDetails> for ShippingAddress {
    fn from(c: &CustomerDetails) -> Self {
        Self {
            address: c.address.clone(),
            city: c.city.clone(),
            state: c.state.clone(),
            postal_code: c.postal_code.clone(),
        }
    }
}

/// Lower-cases, trims and collapses internal whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ").to_lowercase()
}

/// Non-blank zones, paired with their normalised form.
fn active_zones(zones: &[String]) -> Vec<(&str, String)> {
    zones.iter().map(|z| (z.trim(), normalize(z))).filter(|(_, n)| !n.is_empty()).collect()
}

/// Substring matching over the address text.
///
/// Every zone, textual or numeric, matches anywhere in the combined address, city, state and postal code.
pub fn local_deliverability(address: &ShippingAddress, zones: &[String]) -> Deliverability {
    let zones = active_zones(zones);
    if zones.is_empty() {
        return Deliverability::unrestricted();
    }
    let haystack = normalize(&format!("{} {} {} {}", address.address, address.city, address.state, address.postal_code));
    let matched = zones
        .into_iter()
        .filter(|(_, zone)| haystack.contains(zone.as_str()))
        .map(|(original, _)| original.to_string())
        .collect();
    Deliverability::from_matches(matched)
}

/// Bidirectional containment between the zones and the structured fields of a geocoded place.
pub fn place_deliverability(place: &GeoPlace, zones: &[String]) -> Deliverability {
    let zones = active_zones(zones);
    if zones.is_empty() {
        return Deliverability::unrestricted();
    }
    let fields = place.locality_fields().map(normalize).filter(|f| !f.is_empty()).collect::<Vec<String>>();
    let matched = zones
        .into_iter()
        .filter(|(_, zone)| fields.iter().any(|f| f.contains(zone.as_str()) || zone.contains(f.as_str())))
        .map(|(original, _)| original.to_string())
        .collect();
    Deliverability::from_matches(matched)
}

/// Decides whether a business delivers to an address.
#[derive(Debug, Clone)]
pub enum DeliveryZoneMatcher<G> {
    Geocoded(G),
    LocalHeuristic,
}

impl<G> DeliveryZoneMatcher<G> {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            DeliveryZoneMatcher::Geocoded(_) => "geocode",
            DeliveryZoneMatcher::LocalHeuristic => "local",
        }
    }
}

impl<G: Geocoder> DeliveryZoneMatcher<G> {
    pub async fn is_deliverable(&self, address: &ShippingAddress, zones: &[String]) -> Deliverability {
        if active_zones(zones).is_empty() {
            return Deliverability::unrestricted();
        }
        match self {
            DeliveryZoneMatcher::LocalHeuristic => local_deliverability(address, zones),
            DeliveryZoneMatcher::Geocoded(geocoder) => {
                let query = address.one_line();
                match geocoder.lookup(&query).await {
                    Ok(places) => match places.first() {
                        Some(best) => {
                            trace!("🗺️ Best match for '{query}': {}", best.display_name);
                            place_deliverability(best, zones)
                        },
                        None => {
                            debug!("🗺️ No candidates for '{query}'");
                            Deliverability::not_deliverable(LOCATION_NOT_FOUND)
                        },
                    },
                    Err(e) => {
                        warn!("🗺️ Could not geocode '{query}'. {e}");
                        Deliverability::not_deliverable(LOCATION_NOT_FOUND)
                    },
                }
            },
        }
    }
}
