use futures::future::BoxFuture;
use gateway_tools::{MerchantMessage, MerchantNotifier, NotifierConfig, NotifierError};
use log::*;
use storefront_engine::{
    db_types::Order,
    events::{CashOrderCreatedEvent, EventHandlers, EventHooks, OrderPaidEvent},
};

pub const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 50;

/// Messages the merchant whenever an order needs their attention:
///
/// 1. OrderPaidEvent - an online order has been paid and can be packed.
/// 2. CashOrderCreatedEvent - a cash-on-delivery order came in. Payment is collected at the door.
///
/// Delivery is best effort. A failed message is logged and never affects the order.
pub fn create_notification_handlers(config: NotifierConfig) -> Result<EventHandlers, NotifierError> {
    let mut hooks = EventHooks::default();
    let notifier = MerchantNotifier::new(config)?;
    let notifier_clone = notifier.clone();
    // --- On OrderPaid Handler ---
    hooks.on_order_paid(move |ev| {
        let Some(to) = ev.merchant_phone.clone() else {
            info!("📨️ {} has no contact number. Not notifying them of paid order {}.", ev.business_name, ev.order.order_id);
            return no_op();
        };
        let message = MerchantMessage { to, text: order_paid_message(&ev) };
        send(notifier_clone.clone(), message)
    });
    // --- On CashOrderCreated Handler ---
    hooks.on_cash_order_created(move |ev| {
        let Some(to) = ev.merchant_phone.clone() else {
            info!("📨️ {} has no contact number. Not notifying them of cash order {}.", ev.business_name, ev.order.order_id);
            return no_op();
        };
        let message = MerchantMessage { to, text: cash_order_message(&ev) };
        send(notifier.clone(), message)
    });
    let handlers = EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks);
    Ok(handlers)
}

fn send(notifier: MerchantNotifier, message: MerchantMessage) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        match notifier.send(&message).await {
            Ok(()) => debug!("📨️ Merchant {} notified", message.to),
            Err(e) => warn!("📨️ Could not notify merchant {}. {e}", message.to),
        }
    })
}

fn order_summary(order: &Order) -> String {
    let items = order.line_items.iter().map(|i| format!("{} x {}", i.quantity, i.name)).collect::<Vec<_>>().join(", ");
    let c = &order.customer;
    format!(
        "{items}\nTotal {} (your share {})\nDeliver to {}, {}, {}, {} {}. Phone {}",
        order.total_amount, order.seller_amount, c.name, c.address, c.city, c.state, c.postal_code, c.phone
    )
}

pub fn order_paid_message(ev: &OrderPaidEvent) -> String {
    format!("{}: order {} is PAID online.\n{}", ev.business_name, ev.order.order_id, order_summary(&ev.order))
}

pub fn cash_order_message(ev: &CashOrderCreatedEvent) -> String {
    format!(
        "{}: new CASH ON DELIVERY order {}. Collect {} on delivery.\n{}",
        ev.business_name,
        ev.order.order_id,
        ev.order.total_amount,
        order_summary(&ev.order)
    )
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}
