use actix_web::{http::StatusCode, test, test::TestRequest, App};
use serde_json::{json, Value};
use storefront_engine::{checkout_objects::RemoteOrder, helpers::calculate_payment_signature};

use super::{
    helpers::*,
    mocks::{MockGateway, MockGeoLookup},
};
use crate::routes::health;

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init();
    let app = test::init_service(App::new().service(health)).await;
    let (status, body) = call(&app, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn deliverability_with_the_geocoder() {
    let _ = env_logger::try_init();
    let api = geocoded_api(seeded_db().await, MockGateway::new(), geocoder_in_fort());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let req =
        TestRequest::get().uri("/store/chai-corner/deliverability?address=12%20Marine%20Drive&city=Mumbai&postal_code=");
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["deliverable"], true);
    assert_eq!(result["matched_zones"], json!(["400001"]));
}

#[actix_web::test]
async fn deliverability_of_an_unknown_place() {
    let _ = env_logger::try_init();
    let mut geocoder = MockGeoLookup::new();
    geocoder.expect_lookup().times(1).returning(|_| Ok(vec![]));
    let api = geocoded_api(seeded_db().await, MockGateway::new(), geocoder);
    let app = test::init_service(App::new().configure(configure(api))).await;
    let req = TestRequest::get().uri("/store/chai-corner/deliverability?address=Nowhere%20Lane");
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["deliverable"], false);
    assert_eq!(result["reason"], "Location not found");
}

#[actix_web::test]
async fn online_checkout_registers_the_full_total() {
    let _ = env_logger::try_init();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_order()
        .withf(|credentials, amount, currency, _| {
            credentials.key_id == "rzp_test_chai" && amount.value() == 100_000 && currency == "INR"
        })
        .times(1)
        .returning(|_, amount, currency, _| {
            Ok(storefront_engine::traits::RemoteGatewayOrder {
                id: "order_mock_1".into(),
                amount,
                currency: currency.to_string(),
            })
        });
    let api = geocoded_api(seeded_db().await, gateway, geocoder_in_fort());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let remote: RemoteOrder = serde_json::from_str(&body).unwrap();
    assert_eq!(remote.gateway_order_id, "order_mock_1");
    assert_eq!(remote.gateway_public_key, "rzp_test_chai");
    assert_eq!(remote.amount.value(), 100_000);
    assert_eq!(remote.breakdown.platform_fee.value(), 5_000);
    assert_eq!(remote.breakdown.seller_amount.value(), 95_000);
    assert_eq!(remote.business_name, "Chai Corner");
    assert!(!remote.reused);
    assert!(!body.contains(KEY_SECRET));
}

#[actix_web::test]
async fn online_checkout_accepts_a_whole_cart() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = json!({
        "items": [
            { "product_id": "masala-chai", "name": "Masala chai", "unit_price": 4_000, "quantity": 3 },
            { "product_id": "samosa", "name": "Samosa", "unit_price": 2_550, "quantity": 2 }
        ],
        "customer": customer_json("4 Veera Desai Road, Andheri West", "Mumbai", "400053")
    });
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let remote: RemoteOrder = serde_json::from_str(&body).unwrap();
    // 12000 + 5100 = 17100 paise. 5% is 855.
    assert_eq!(remote.amount.value(), 17_100);
    assert_eq!(remote.breakdown.platform_fee.value(), 855);
    assert_eq!(remote.breakdown.seller_amount.value(), 16_245);
}

#[actix_web::test]
async fn invalid_addresses_list_the_bad_fields() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("1 Main Road", "Nagpur", "4400"));
    let req = TestRequest::post().uri("/store/cash-kitchen/checkout/cash").set_json(body);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["fields"][0]["field"], "postal_code");
}

#[actix_web::test]
async fn out_of_area_checkout_is_refused_with_suggestions() {
    let _ = env_logger::try_init();
    // The gateway must not be called for a refused address
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("7 FC Road, Shivajinagar", "Pune", "411005"));
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["suggestions"], json!(["400001", "Andheri"]));
}

#[actix_web::test]
async fn unknown_businesses_are_not_found() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/no-such-shop/checkout/online").set_json(body);
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn online_checkout_without_gateway_keys() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/cash-kitchen/checkout/online").set_json(body);
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn gateway_outages_are_bad_gateway() {
    let _ = env_logger::try_init();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_order()
        .times(1)
        .returning(|_, _, _, _| Err(storefront_engine::traits::GatewayError::Unavailable("timed out".into())));
    let api = local_api(seeded_db().await, gateway);
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn completing_a_payment() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (_, body) = call(&app, req).await;
    let remote: RemoteOrder = serde_json::from_str(&body).unwrap();

    let signature = calculate_payment_signature(KEY_SECRET, &remote.gateway_order_id, "pay_001");
    let completion = json!({
        "gateway_order_id": remote.gateway_order_id,
        "gateway_payment_id": "pay_001",
        "signature": signature,
    });
    let req = TestRequest::post().uri("/store/chai-corner/checkout/complete").set_json(&completion);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "paid");
    assert_eq!(order["gateway_payment_id"], "pay_001");
    assert!(order.get("gateway_signature").is_none());
    let first_update = order["updated_at"].clone();

    // A repeated completion is a no-op
    let req = TestRequest::post().uri("/store/chai-corner/checkout/complete").set_json(&completion);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "paid");
    assert_eq!(order["updated_at"], first_update);
}

#[actix_web::test]
async fn tampered_signatures_leave_the_order_pending() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("12 Marine Drive", "Mumbai", "400001"));
    let req = TestRequest::post().uri("/store/chai-corner/checkout/online").set_json(body);
    let (_, body) = call(&app, req).await;
    let remote: RemoteOrder = serde_json::from_str(&body).unwrap();

    let signature = calculate_payment_signature("not-the-key-secret", &remote.gateway_order_id, "pay_002");
    let completion = json!({
        "gateway_order_id": remote.gateway_order_id,
        "gateway_payment_id": "pay_002",
        "signature": signature,
    });
    let req = TestRequest::post().uri("/store/chai-corner/checkout/complete").set_json(completion);
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/store/chai-corner/order/{}", remote.internal_order_id.as_str());
    let (status, body) = call(&app, TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "pending_payment");
    assert_eq!(order["gateway_payment_id"], Value::Null);
}

#[actix_web::test]
async fn cash_orders_skip_the_gateway() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("9 Civil Lines", "Nagpur", "440001"));
    let req = TestRequest::post().uri("/store/cash-kitchen/checkout/cash").set_json(body);
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "pending_cash");
    assert_eq!(order["payment_method"], "cash");
    assert_eq!(order["total_amount"], 100_000);
    assert_eq!(order["gateway_order_id"], Value::Null);
}

#[actix_web::test]
async fn orders_are_scoped_to_their_business() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, MockGateway::new());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let body = buy_now_json(customer_json("9 Civil Lines", "Nagpur", "440001"));
    let req = TestRequest::post().uri("/store/cash-kitchen/checkout/cash").set_json(body);
    let (_, body) = call(&app, req).await;
    let order: Value = serde_json::from_str(&body).unwrap();
    let order_id = order["order_id"].as_str().unwrap();

    let (status, _) = call(&app, TestRequest::get().uri(&format!("/store/cash-kitchen/order/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, TestRequest::get().uri(&format!("/store/chai-corner/order/{order_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
