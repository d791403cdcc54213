use crate::{
    db_types::{Business, NewBusiness, Order, OrderId},
    traits::StoreError,
};

/// The `BusinessManagement` trait defines read (and registration) access to the business store.
///
/// Business CRUD proper belongs to the admin side of the platform. The checkout pipeline only needs to resolve a
/// microsite slug into the merchant's delivery area and gateway credentials, and to look orders up again.
#[allow(async_fn_in_trait)]
pub trait BusinessManagement {
    /// Resolves a microsite slug. Slugs are unique, so at most one business is returned.
    async fn fetch_business_by_slug(&self, slug: &str) -> Result<Option<Business>, StoreError>;

    async fn fetch_business_by_id(&self, id: i64) -> Result<Option<Business>, StoreError>;

    /// Registers a new business. Fails with [`StoreError::BusinessAlreadyExists`] if the slug is taken.
    async fn insert_business(&self, business: NewBusiness) -> Result<Business, StoreError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders placed with the business, oldest first.
    async fn fetch_orders_for_business(&self, business_id: i64) -> Result<Vec<Order>, StoreError>;
}
