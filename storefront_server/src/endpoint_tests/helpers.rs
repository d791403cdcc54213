use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use log::debug;
use sfb_common::{Paise, Secret};
use storefront_engine::{
    db_types::NewBusiness,
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{GeoPlace, RemoteGatewayOrder},
    BusinessManagement,
    CheckoutApi,
    DeliveryZoneMatcher,
    SqliteDatabase,
};

use super::mocks::{MockGateway, MockGeoLookup};
use crate::{
    config::ServerOptions,
    middleware::{HmacMiddlewareFactory, WEBHOOK_SIGNATURE_HEADER},
    routes::{
        CheckoutCashRoute,
        CheckoutCompleteRoute,
        CheckoutOnlineRoute,
        DeliverabilityRoute,
        OrderByIdRoute,
        PaymentWebhookRoute,
    },
};

pub type TestApi = CheckoutApi<SqliteDatabase, MockGateway, MockGeoLookup>;

pub const KEY_SECRET: &str = "endpoint-key-secret";
pub const WEBHOOK_SECRET: &str = "endpoint-webhook-secret";

/// A fresh database with two merchants:
/// * `chai-corner` delivers to `400001` and Andheri, and takes online payments.
/// * `cash-kitchen` delivers everywhere, and has no gateway keys.
pub async fn seeded_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let chai = NewBusiness::new("chai-corner", "Chai Corner")
        .with_delivery_area(["400001", "Andheri"])
        .with_gateway_keys("rzp_test_chai", KEY_SECRET);
    db.insert_business(chai).await.expect("Error creating business");
    db.insert_business(NewBusiness::new("cash-kitchen", "Cash Kitchen")).await.expect("Error creating business");
    db
}

/// A gateway that registers every order it is asked for, `times` times in total.
pub fn gateway_expecting(times: usize) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().times(times).returning(|_, amount, currency, receipt| {
        Ok(RemoteGatewayOrder { id: format!("order_{}", receipt.as_str()), amount, currency: currency.to_string() })
    });
    gateway
}

/// A geocoder that resolves every address to Fort, Mumbai 400001.
pub fn geocoder_in_fort() -> MockGeoLookup {
    let mut geocoder = MockGeoLookup::new();
    geocoder.expect_lookup().returning(|_| {
        Ok(vec![GeoPlace {
            display_name: "Fort, Mumbai, Maharashtra, 400001, India".into(),
            city: Some("Mumbai".into()),
            suburb: Some("Fort".into()),
            state: Some("Maharashtra".into()),
            postal_code: Some("400001".into()),
            ..Default::default()
        }])
    });
    geocoder
}

pub fn local_api(db: SqliteDatabase, gateway: MockGateway) -> TestApi {
    CheckoutApi::new(db, gateway, DeliveryZoneMatcher::LocalHeuristic, EventProducers::default())
}

pub fn geocoded_api(db: SqliteDatabase, gateway: MockGateway, geocoder: MockGeoLookup) -> TestApi {
    CheckoutApi::new(db, gateway, DeliveryZoneMatcher::Geocoded(geocoder), EventProducers::default())
}

/// Registers the checkout routes the way the server's `/api` scope does, minus the prefix.
pub fn configure(api: TestApi) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(DeliverabilityRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new())
            .service(CheckoutOnlineRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new())
            .service(CheckoutCompleteRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new())
            .service(CheckoutCashRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new())
            .service(OrderByIdRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new());
    }
}

/// The webhook scope, behind signature checks with [`WEBHOOK_SECRET`].
pub fn configure_webhook(api: TestApi) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let hmac = HmacMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, Secret::new(WEBHOOK_SECRET.to_string()), true);
        cfg.app_data(web::Data::new(api)).app_data(web::Data::new(ServerOptions::default())).service(
            web::scope("/webhook")
                .wrap(hmac)
                .service(PaymentWebhookRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new())
                .service(OrderByIdRoute::<SqliteDatabase, MockGateway, MockGeoLookup>::new()),
        );
    }
}

/// Calls the service and returns the status and body. Errors raised by middleware are turned into their responses.
pub async fn call<S, B>(app: &S, req: TestRequest) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            let body = String::from_utf8_lossy(&body).into_owned();
            debug!("🚀️ {status}: {body}");
            (status, body)
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

pub fn customer_json(address: &str, city: &str, postal_code: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Priya Sharma",
        "phone": "9876543210",
        "email": "priya@example.com",
        "address": address,
        "city": city,
        "state": "Maharashtra",
        "postal_code": postal_code
    })
}

/// A single ₹1000 product, bought with "buy now".
pub fn buy_now_json(customer: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "item": { "product_id": "brass-diya", "name": "Brass diya", "unit_price": Paise::from_rupees(1000), "quantity": 1 },
        "customer": customer
    })
}
