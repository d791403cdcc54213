use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use storefront_engine::{events::EventProducers, CheckoutApi, DeliveryZoneMatcher, SqliteDatabase};

use crate::{
    config::{DeliveryStrategy, ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{create_notification_handlers, GatewayClient, GeocoderClient},
    middleware::{HmacMiddlewareFactory, WEBHOOK_SIGNATURE_HEADER},
    routes::{
        health,
        CheckoutCashRoute,
        CheckoutCompleteRoute,
        CheckoutOnlineRoute,
        DeliverabilityRoute,
        OrderByIdRoute,
        PaymentWebhookRoute,
    },
};

pub type StorefrontApi = CheckoutApi<SqliteDatabase, GatewayClient, GeocoderClient>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migrations failed. {e}")))?;
    let handlers = create_notification_handlers(config.notifier.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let gateway = GatewayClient::new(config.gateway_api.clone())?;
    let geocoder = GeocoderClient::new(config.geocoder.clone())?;
    let options = ServerOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let matcher = match config.delivery_strategy {
            DeliveryStrategy::Geocode => DeliveryZoneMatcher::Geocoded(geocoder.clone()),
            DeliveryStrategy::Local => DeliveryZoneMatcher::LocalHeuristic,
        };
        let checkout_api: StorefrontApi = CheckoutApi::new(db.clone(), gateway.clone(), matcher, producers.clone())
            .with_reuse_window(config.pending_order_reuse_window);
        let api_scope = web::scope("/api")
            .service(DeliverabilityRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new())
            .service(CheckoutOnlineRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new())
            .service(CheckoutCompleteRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new())
            .service(CheckoutCashRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new())
            .service(OrderByIdRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new());
        let hmac_middleware = HmacMiddlewareFactory::new(
            WEBHOOK_SIGNATURE_HEADER,
            config.webhook.secret.clone(),
            config.webhook.checks,
        );
        let webhook_scope = web::scope("/webhook")
            .wrap(hmac_middleware)
            .service(PaymentWebhookRoute::<SqliteDatabase, GatewayClient, GeocoderClient>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfb::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(options))
            .service(health)
            .service(api_scope)
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
