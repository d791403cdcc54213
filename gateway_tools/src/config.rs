use log::*;
use sfb_common::Secret;

const DEFAULT_GATEWAY_API_URL: &str = "https://api.razorpay.com/v1";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODER_USER_AGENT: &str = "storefront-checkout/0.1 (delivery zone lookup)";

#[derive(Debug, Clone)]
pub struct GatewayApiConfig {
    /// Base URL of the gateway's REST API, without a trailing slash.
    pub api_url: String,
}

impl Default for GatewayApiConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_GATEWAY_API_URL.to_string() }
    }
}

impl GatewayApiConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SFB_GATEWAY_API_URL").unwrap_or_else(|_| {
            info!("SFB_GATEWAY_API_URL not set, using {DEFAULT_GATEWAY_API_URL}");
            DEFAULT_GATEWAY_API_URL.to_string()
        });
        Self { api_url: api_url.trim_end_matches('/').to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub url: String,
    /// Nominatim's usage policy requires a descriptive client identifier on every request.
    pub user_agent: String,
    pub max_results: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
            max_results: 5,
        }
    }
}

impl GeocoderConfig {
    pub fn new_from_env_or_default() -> Self {
        let url = std::env::var("SFB_GEOCODER_URL").unwrap_or_else(|_| {
            info!("SFB_GEOCODER_URL not set, using {DEFAULT_GEOCODER_URL}");
            DEFAULT_GEOCODER_URL.to_string()
        });
        let user_agent = std::env::var("SFB_GEOCODER_USER_AGENT").unwrap_or_else(|_| {
            warn!("SFB_GEOCODER_USER_AGENT not set. Public geocoders may throttle the generic default identifier.");
            DEFAULT_GEOCODER_USER_AGENT.to_string()
        });
        Self { url: url.trim_end_matches('/').to_string(), user_agent, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    /// The messaging webhook to POST merchant messages to. When `None`, messages are only logged.
    pub url: Option<String>,
    pub token: Secret<String>,
}

impl NotifierConfig {
    pub fn new_from_env_or_default() -> Self {
        let url = std::env::var("SFB_NOTIFY_URL").ok().filter(|s| !s.trim().is_empty());
        if url.is_none() {
            warn!("SFB_NOTIFY_URL not set. Merchant notifications will only be written to the log.");
        }
        let token = Secret::new(std::env::var("SFB_NOTIFY_TOKEN").unwrap_or_default());
        Self { url, token }
    }
}
