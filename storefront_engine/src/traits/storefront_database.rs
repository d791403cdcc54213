use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, PaidTransition},
    traits::BusinessManagement,
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("A business with slug '{0}' already exists")]
    BusinessAlreadyExists(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Gateway order {0} is already attached to another order")]
    GatewayOrderAlreadyAttached(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// This trait defines the order-ledger behaviour the checkout pipeline needs from a backend.
///
/// This behaviour includes:
/// * Writing new orders in their initial state (`pending_payment` for online, `pending_cash` for cash on delivery)
/// * Linking a pending order to the gateway order that was registered for it
/// * The `pending_payment -> paid` transition, which must be atomic and idempotent
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + BusinessManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order. The initial status is derived from the payment method.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Records the gateway's order id against a `pending_payment` order. A gateway order id can only ever belong to
    /// one order.
    async fn attach_gateway_order(&self, order_id: &OrderId, gateway_order_id: &str) -> Result<Order, StoreError>;

    /// The most recent `pending_payment` order for the business that carries the given intent fingerprint and already
    /// has a gateway order attached.
    async fn fetch_pending_order_by_fingerprint(
        &self,
        business_id: i64,
        fingerprint: &str,
    ) -> Result<Option<Order>, StoreError>;

    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Moves the order linked to `gateway_order_id` from `pending_payment` to `paid` in a single conditional update,
    /// recording the gateway payment id and signature.
    ///
    /// If `business_id` is given, only an order belonging to that business is considered.
    ///
    /// ## Returns
    /// * `Ok(None)` if no order is linked to the gateway order id (within the business, if given).
    /// * `Ok(Some(t))` with `t.newly_paid == true` if this call performed the transition.
    /// * `Ok(Some(t))` with `t.newly_paid == false` if the order was not pending any more (e.g. a duplicate callback).
    ///   Nothing is written in this case.
    async fn mark_order_paid(
        &self,
        business_id: Option<i64>,
        gateway_order_id: &str,
        payment_id: &str,
        signature: Option<&str>,
    ) -> Result<Option<PaidTransition>, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
