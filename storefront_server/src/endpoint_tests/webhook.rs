use actix_web::{http::StatusCode, test, test::TestRequest, App};
use serde_json::{json, Value};
use storefront_engine::{
    checkout_objects::RemoteOrder,
    db_types::CartLineItem,
    helpers::calculate_webhook_signature,
    CheckoutApi,
};

use super::helpers::*;
use crate::middleware::WEBHOOK_SIGNATURE_HEADER;

fn captured_event(gateway_order_id: &str, payment_id: &str, amount: i64) -> String {
    json!({
        "entity": "event",
        "event": "payment.captured",
        "contains": ["payment"],
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "entity": "payment",
                    "amount": amount,
                    "currency": "INR",
                    "status": "captured",
                    "order_id": gateway_order_id,
                    "method": "upi"
                }
            }
        },
        "created_at": 1_726_000_000
    })
    .to_string()
}

fn signed(body: String) -> TestRequest {
    let signature = calculate_webhook_signature(WEBHOOK_SECRET, body.as_bytes());
    TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((WEBHOOK_SIGNATURE_HEADER, signature))
        .set_payload(body)
}

/// Creates an online order for ₹1000 directly through the engine, as the checkout endpoint would.
async fn pending_order(api: &TestApi) -> RemoteOrder {
    let items = vec![CartLineItem::new("brass-diya", "Brass diya", sfb_common::Paise::from_rupees(1000), 1)];
    let customer = serde_json::from_value(customer_json("12 Marine Drive", "Mumbai", "400001")).unwrap();
    CheckoutApi::create_remote_order(api, "chai-corner", items, customer).await.expect("Error creating order")
}

#[actix_web::test]
async fn captured_payments_settle_the_order() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let remote = pending_order(&api).await;
    let app = test::init_service(App::new().configure(configure_webhook(api))).await;

    let (status, body) = call(&app, signed(captured_event(&remote.gateway_order_id, "pay_hook_1", 100_000))).await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["success"], true);
    assert!(response["message"].as_str().unwrap().ends_with("is paid"));

    // A redelivered webhook is acknowledged and changes nothing
    let (status, _) = call(&app, signed(captured_event(&remote.gateway_order_id, "pay_hook_1", 100_000))).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn captured_amount_must_match_the_order() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let remote = pending_order(&api).await;
    let app = test::init_service(App::new().configure(configure_webhook(api))).await;

    let (status, _) = call(&app, signed(captured_event(&remote.gateway_order_id, "pay_hook_2", 100))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_gateway_orders_are_not_found() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(0));
    let app = test::init_service(App::new().configure(configure_webhook(api))).await;
    let (status, _) = call(&app, signed(captured_event("order_nobody_made", "pay_hook_3", 100_000))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn other_events_are_ignored() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(0));
    let app = test::init_service(App::new().configure(configure_webhook(api))).await;
    let body = json!({ "event": "refund.created", "payload": {} }).to_string();
    let (status, body) = call(&app, signed(body)).await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["message"], "Event refund.created ignored");
}

#[actix_web::test]
async fn unsigned_webhooks_are_forbidden() {
    let _ = env_logger::try_init();
    let api = local_api(seeded_db().await, gateway_expecting(1));
    let remote = pending_order(&api).await;
    let app = test::init_service(App::new().configure(configure_webhook(api))).await;

    let body = captured_event(&remote.gateway_order_id, "pay_forged", 100_000);
    let forged = calculate_webhook_signature("guessed-secret", body.as_bytes());
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((WEBHOOK_SIGNATURE_HEADER, forged))
        .set_payload(body);
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/webhook/store/chai-corner/order/{}", remote.internal_order_id.as_str());
    let signature = calculate_webhook_signature(WEBHOOK_SECRET, b"");
    let req = TestRequest::get().uri(&uri).insert_header((WEBHOOK_SIGNATURE_HEADER, signature));
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "pending_payment");
}
