use serde::{Deserialize, Serialize};

use crate::db_types::{Business, Order};

/// Emitted exactly once per order, when the `pending_payment -> paid` transition is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub business_name: String,
    pub merchant_phone: Option<String>,
}

impl OrderPaidEvent {
    pub fn new(order: Order, business: &Business) -> Self {
        Self { order, business_name: business.name.clone(), merchant_phone: business.contact_phone.clone() }
    }
}

/// Emitted when a cash-on-delivery order has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOrderCreatedEvent {
    pub order: Order,
    pub business_name: String,
    pub merchant_phone: Option<String>,
}

impl CashOrderCreatedEvent {
    pub fn new(order: Order, business: &Business) -> Self {
        Self { order, business_name: business.name.clone(), merchant_phone: business.contact_phone.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    CashOrderCreated(CashOrderCreatedEvent),
}
