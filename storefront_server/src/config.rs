use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use gateway_tools::{GatewayApiConfig, GeocoderConfig, NotifierConfig};
use log::*;
use sfb_common::{parse_boolean_flag, Secret};
use storefront_engine::DEFAULT_REUSE_WINDOW_MINUTES;

const DEFAULT_SFB_HOST: &str = "127.0.0.1";
const DEFAULT_SFB_PORT: u16 = 8380;
const DEFAULT_SFB_DATABASE_URL: &str = "sqlite://data/storefront.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How addresses are checked against a merchant's delivery area.
    pub delivery_strategy: DeliveryStrategy,
    pub geocoder: GeocoderConfig,
    pub gateway_api: GatewayApiConfig,
    pub webhook: WebhookConfig,
    pub notifier: NotifierConfig,
    /// How long a pending gateway order is handed out again for an identical checkout attempt.
    pub pending_order_reuse_window: Duration,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFB_HOST.to_string(),
            port: DEFAULT_SFB_PORT,
            database_url: DEFAULT_SFB_DATABASE_URL.to_string(),
            delivery_strategy: DeliveryStrategy::default(),
            geocoder: GeocoderConfig::default(),
            gateway_api: GatewayApiConfig::default(),
            webhook: WebhookConfig::default(),
            notifier: NotifierConfig::default(),
            pending_order_reuse_window: Duration::minutes(DEFAULT_REUSE_WINDOW_MINUTES),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFB_HOST").ok().unwrap_or_else(|| DEFAULT_SFB_HOST.into());
        let port = env::var("SFB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFB_PORT. {e} Using the default, {DEFAULT_SFB_PORT}, instead."
                    );
                    DEFAULT_SFB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFB_PORT);
        let database_url = env::var("SFB_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SFB_DATABASE_URL is not set. Using {DEFAULT_SFB_DATABASE_URL}.");
            DEFAULT_SFB_DATABASE_URL.to_string()
        });
        let delivery_strategy = env::var("SFB_DELIVERY_STRATEGY")
            .ok()
            .and_then(|s| {
                s.parse::<DeliveryStrategy>()
                    .map_err(|e| warn!("🪛️ {e} Falling back to the {} strategy.", DeliveryStrategy::default()))
                    .ok()
            })
            .unwrap_or_default();
        info!("🪛️ Delivery areas are checked with the {delivery_strategy} strategy");
        let pending_order_reuse_window = configure_reuse_window();
        let use_x_forwarded_for = parse_boolean_flag(env::var("SFB_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SFB_USE_FORWARDED").ok(), false);
        Self {
            host,
            port,
            database_url,
            delivery_strategy,
            geocoder: GeocoderConfig::new_from_env_or_default(),
            gateway_api: GatewayApiConfig::new_from_env_or_default(),
            webhook: WebhookConfig::from_env_or_default(),
            notifier: NotifierConfig::new_from_env_or_default(),
            pending_order_reuse_window,
            use_x_forwarded_for,
            use_forwarded,
        }
    }
}

fn configure_reuse_window() -> Duration {
    let default = Duration::minutes(DEFAULT_REUSE_WINDOW_MINUTES);
    env::var("SFB_PENDING_ORDER_REUSE_WINDOW")
        .map_err(|_| {
            info!(
                "🪛️ SFB_PENDING_ORDER_REUSE_WINDOW is not set. Using the default value of {} minutes.",
                default.num_minutes()
            )
        })
        .and_then(|s| {
            s.trim()
                .parse::<i64>()
                .map(Duration::minutes)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SFB_PENDING_ORDER_REUSE_WINDOW. {e}"))
        })
        .ok()
        .unwrap_or(default)
}

//------------------------------------------------  DeliveryStrategy  --------------------------------------------------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// Resolve the address with the geocoder, then match zones against the best candidate.
    #[default]
    Geocode,
    /// Match zones against the address text. No network calls.
    Local,
}

impl Display for DeliveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStrategy::Geocode => write!(f, "geocode"),
            DeliveryStrategy::Local => write!(f, "local"),
        }
    }
}

impl FromStr for DeliveryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geocode" | "geocoded" | "nominatim" => Ok(Self::Geocode),
            "local" | "text" => Ok(Self::Local),
            other => Err(format!("'{other}' is not a delivery strategy. Use 'geocode' or 'local'.")),
        }
    }
}

//-------------------------------------------------  WebhookConfig  ----------------------------------------------------
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// The secret the payment gateway signs webhook bodies with
    pub secret: Secret<String>,
    /// If false, webhook signatures are not checked. **DANGER**
    pub checks: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { secret: Secret::default(), checks: true }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let secret = env::var("SFB_GATEWAY_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ SFB_GATEWAY_WEBHOOK_SECRET is not set. Please set it to the webhook secret configured on your \
                 payment gateway dashboard. Until then, every payment webhook will be rejected."
            );
            String::default()
        });
        let checks = parse_boolean_flag(env::var("SFB_GATEWAY_WEBHOOK_CHECKS").ok(), true);
        if !checks {
            warn!("🚨️ Payment webhook signature checks are DISABLED. Anyone can mark orders as paid. 🚨️");
        }
        Self { secret: Secret::new(secret), checks }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
