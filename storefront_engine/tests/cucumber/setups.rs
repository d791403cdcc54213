use cucumber::given;
use storefront_engine::{db_types::NewBusiness, BusinessManagement};

use crate::cucumber::{storefront_world::CheckoutSystem, StorefrontWorld};

pub const KEY_SECRET: &str = "cucumber-key-secret";

#[given("a fresh install")]
async fn fresh_database(world: &mut StorefrontWorld) {
    let system = CheckoutSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a business {string} named {string} with gateway keys")]
async fn business_with_keys(world: &mut StorefrontWorld, slug: String, name: String) {
    let business = NewBusiness::new(slug.clone(), name).with_gateway_keys(format!("rzp_test_{slug}"), KEY_SECRET.into());
    world.api().db().insert_business(business).await.expect("Error creating business");
}

#[given(expr = "a business {string} named {string} that only takes cash")]
async fn cash_only_business(world: &mut StorefrontWorld, slug: String, name: String) {
    world.api().db().insert_business(NewBusiness::new(slug, name)).await.expect("Error creating business");
}

#[given(expr = "a business {string} named {string} with gateway keys delivering to {string}")]
async fn business_with_zones(world: &mut StorefrontWorld, slug: String, name: String, zones: String) {
    let business = NewBusiness::new(slug.clone(), name)
        .with_gateway_keys(format!("rzp_test_{slug}"), KEY_SECRET.into())
        .with_delivery_area(zones.split(','));
    world.api().db().insert_business(business).await.expect("Error creating business");
}
