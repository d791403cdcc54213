use cucumber::World;
use log::*;
use storefront_engine::{
    checkout_objects::RemoteOrder,
    db_types::Order,
    events::EventProducers,
    test_utils::{
        fakes::{FakeGateway, FakeGeocoder},
        prepare_env::{prepare_test_env, random_db_path},
    },
    CheckoutApi,
    CheckoutApiError,
    DeliveryZoneMatcher,
    SqliteDatabase,
};

pub type TestApi = CheckoutApi<SqliteDatabase, FakeGateway, FakeGeocoder>;

#[derive(Default, Debug, World)]
pub struct StorefrontWorld {
    pub system: Option<CheckoutSystem>,
    pub remote_order: Option<RemoteOrder>,
    pub order: Option<Order>,
    pub last_error: Option<CheckoutApiError>,
}

#[derive(Debug)]
pub struct CheckoutSystem {
    pub db_path: String,
    pub gateway: FakeGateway,
    pub api: TestApi,
}

impl StorefrontWorld {
    pub fn api(&self) -> &TestApi {
        &self.system.as_ref().expect("CheckoutApi not initialised").api
    }

    pub fn gateway(&self) -> &FakeGateway {
        &self.system.as_ref().expect("CheckoutApi not initialised").gateway
    }

    pub fn remote_order(&self) -> &RemoteOrder {
        self.remote_order.as_ref().expect("No online order has been created")
    }
}

impl CheckoutSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let gateway = FakeGateway::default();
        let api = CheckoutApi::new(db, gateway.clone(), DeliveryZoneMatcher::LocalHeuristic, EventProducers::default());
        Self { db_path: url, gateway, api }
    }
}
