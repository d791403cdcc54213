use cucumber::{then, when};
use sfb_common::Paise;
use storefront_engine::{
    checkout_objects::PaymentCompletion,
    db_types::{CartLineItem, CustomerDetails, OrderStatusType},
    helpers::calculate_payment_signature,
    BusinessManagement,
    CheckoutApiError,
};

use crate::cucumber::{setups::KEY_SECRET, StorefrontWorld};

fn buyer_in(city: &str, postal_code: &str) -> CustomerDetails {
    CustomerDetails {
        name: "Kavya Nair".into(),
        phone: "9447001122".into(),
        email: None,
        address: "House 7, Temple Road".into(),
        landmark: None,
        city: city.into(),
        state: "Maharashtra".into(),
        postal_code: postal_code.into(),
    }
}

fn cart(qty: i64, name: &str, rupees: i64) -> Vec<CartLineItem> {
    vec![CartLineItem::new(name.to_lowercase().replace(' ', "-"), name.to_string(), Paise::from_rupees(rupees), qty)]
}

#[when(expr = "a buyer in {word} {word} checks out {int} x {string} at {int} rupees online at {string}")]
async fn online_checkout(
    world: &mut StorefrontWorld,
    city: String,
    postal_code: String,
    qty: i64,
    name: String,
    rupees: i64,
    slug: String,
) {
    let items = cart(qty, &name, rupees);
    match world.api().create_remote_order(&slug, items, buyer_in(&city, &postal_code)).await {
        Ok(remote) => {
            world.order = Some(world.api().fetch_order(&slug, &remote.internal_order_id).await.expect("Order missing"));
            world.remote_order = Some(remote);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "a buyer in {word} {word} checks out {int} x {string} at {int} rupees with cash at {string}")]
async fn cash_checkout(
    world: &mut StorefrontWorld,
    city: String,
    postal_code: String,
    qty: i64,
    name: String,
    rupees: i64,
    slug: String,
) {
    let items = cart(qty, &name, rupees);
    match world.api().create_cash_order(&slug, items, buyer_in(&city, &postal_code)).await {
        Ok(order) => {
            world.order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

async fn complete(world: &mut StorefrontWorld, slug: &str, payment_id: String, signature: String) {
    let completion = PaymentCompletion {
        gateway_order_id: world.remote_order().gateway_order_id.clone(),
        gateway_payment_id: payment_id,
        signature,
    };
    match world.api().complete_order(slug, completion).await {
        Ok(order) => {
            world.order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "the buyer completes payment {string} at {string} with a valid signature")]
async fn valid_completion(world: &mut StorefrontWorld, payment_id: String, slug: String) {
    let signature = calculate_payment_signature(KEY_SECRET, &world.remote_order().gateway_order_id, &payment_id);
    complete(world, &slug, payment_id, signature).await;
}

#[when(expr = "the buyer completes payment {string} at {string} with the signature for payment {string}")]
async fn mismatched_completion(world: &mut StorefrontWorld, payment_id: String, slug: String, signed_for: String) {
    let signature = calculate_payment_signature(KEY_SECRET, &world.remote_order().gateway_order_id, &signed_for);
    complete(world, &slug, payment_id, signature).await;
}

#[then(expr = "the gateway was asked for {int} paise")]
async fn gateway_amount(world: &mut StorefrontWorld, paise: i64) {
    let requests = world.gateway().requests();
    let (_, amount, _) = requests.last().expect("The gateway was never called");
    assert_eq!(*amount, Paise::from(paise));
}

#[then(expr = "the gateway was called {int} time(s)")]
async fn gateway_calls(world: &mut StorefrontWorld, count: usize) {
    assert_eq!(world.gateway().requests().len(), count);
}

#[then(expr = "the order is {word}")]
async fn order_status(world: &mut StorefrontWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let order_id = &world.order.as_ref().expect("No order").order_id;
    let order = world.api().db().fetch_order_by_order_id(order_id).await.expect("Error fetching order");
    assert_eq!(order.expect("Order missing").status, expected);
}

#[then(expr = "the order has a platform fee of {int} paise and a seller amount of {int} paise")]
async fn order_split(world: &mut StorefrontWorld, fee: i64, seller: i64) {
    let order = world.order.as_ref().expect("No order");
    assert_eq!(order.platform_fee, Paise::from(fee));
    assert_eq!(order.seller_amount, Paise::from(seller));
}

#[then("the order has no gateway references")]
async fn no_gateway_fields(world: &mut StorefrontWorld) {
    let order = world.order.as_ref().expect("No order");
    assert!(order.gateway_order_id.is_none());
    assert!(order.gateway_payment_id.is_none());
}

#[then(expr = "the order records payment {string}")]
async fn order_payment_id(world: &mut StorefrontWorld, payment_id: String) {
    let order = world.order.as_ref().expect("No order");
    assert_eq!(order.gateway_payment_id.as_deref(), Some(payment_id.as_str()));
}

#[then("the signature is rejected")]
async fn signature_rejected(world: &mut StorefrontWorld) {
    assert!(matches!(world.last_error, Some(CheckoutApiError::SignatureInvalid)), "{:?}", world.last_error);
}

#[then("online payments are not configured")]
async fn gateway_not_configured(world: &mut StorefrontWorld) {
    assert!(matches!(world.last_error, Some(CheckoutApiError::GatewayNotConfigured)), "{:?}", world.last_error);
}

#[then(expr = "delivery is refused with suggestion(s) {string}")]
async fn delivery_refused(world: &mut StorefrontWorld, expected: String) {
    match &world.last_error {
        Some(CheckoutApiError::DeliveryIneligible { suggestions, .. }) => {
            let expected = expected.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>();
            assert_eq!(suggestions, &expected);
        },
        other => panic!("Expected delivery to be refused, got {other:?}"),
    }
}

#[then("the checkout succeeded")]
async fn checkout_succeeded(world: &mut StorefrontWorld) {
    assert!(world.last_error.is_none(), "{:?}", world.last_error);
}
