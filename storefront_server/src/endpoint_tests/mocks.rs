use mockall::mock;
use sfb_common::Paise;
use storefront_engine::{
    db_types::{GatewayCredentials, OrderId},
    traits::{GatewayError, GeoPlace, Geocoder, LookupFailed, PaymentGateway, RemoteGatewayOrder},
};

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_order(
            &self,
            credentials: &GatewayCredentials,
            amount: Paise,
            currency: &str,
            receipt: &OrderId,
        ) -> Result<RemoteGatewayOrder, GatewayError>;
    }
}

mock! {
    pub GeoLookup {}
    impl Geocoder for GeoLookup {
        async fn lookup(&self, address: &str) -> Result<Vec<GeoPlace>, LookupFailed>;
    }
}
