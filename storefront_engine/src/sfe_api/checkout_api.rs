use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;
use sfb_common::Paise;

use crate::{
    db_types::{Business, CartLineItem, CustomerDetails, NewOrder, Order, OrderId, PaidTransition, PaymentMethod},
    events::{CashOrderCreatedEvent, EventProducers, OrderPaidEvent},
    helpers::{intent_fingerprint, verify_payment_signature},
    sfe_api::{
        checkout_objects::{PaymentCompletion, PriceBreakdown, RemoteOrder},
        delivery::{Deliverability, DeliveryZoneMatcher, ShippingAddress},
        errors::CheckoutApiError,
        intent::{build_intent, OrderIntent},
    },
    traits::{Geocoder, PaymentGateway, StorefrontDatabase},
};

pub const DEFAULT_REUSE_WINDOW_MINUTES: i64 = 30;

/// `CheckoutApi` is the server side of the checkout pipeline.
///
/// It creates online orders and registers them with the merchant's payment gateway, settles them when the gateway
/// reports payment, and commits cash-on-delivery orders. Each operation resolves the business from its microsite slug
/// first, so one merchant's credentials can never touch another merchant's orders.
pub struct CheckoutApi<B, G, Z> {
    db: B,
    gateway: G,
    matcher: DeliveryZoneMatcher<Z>,
    producers: EventProducers,
    reuse_window: Duration,
}

impl<B, G, Z> Debug for CheckoutApi<B, G, Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({} delivery matching)", self.matcher.strategy_name())
    }
}

impl<B, G, Z> CheckoutApi<B, G, Z> {
    pub fn new(db: B, gateway: G, matcher: DeliveryZoneMatcher<Z>, producers: EventProducers) -> Self {
        Self { db, gateway, matcher, producers, reuse_window: Duration::minutes(DEFAULT_REUSE_WINDOW_MINUTES) }
    }

    /// Sets how long a pending gateway order may be handed out again for an identical checkout attempt. A zero
    /// duration disables reuse.
    pub fn with_reuse_window(mut self, window: Duration) -> Self {
        self.reuse_window = window;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn matcher(&self) -> &DeliveryZoneMatcher<Z> {
        &self.matcher
    }
}

impl<B, G, Z> CheckoutApi<B, G, Z>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    async fn business(&self, slug: &str) -> Result<Business, CheckoutApiError> {
        self.db.fetch_business_by_slug(slug).await?.ok_or_else(|| CheckoutApiError::BusinessNotFound(slug.to_string()))
    }

    /// Whether the business identified by `slug` delivers to `address`.
    pub async fn check_deliverability(
        &self,
        slug: &str,
        address: &ShippingAddress,
    ) -> Result<Deliverability, CheckoutApiError> {
        let business = self.business(slug).await?;
        Ok(self.matcher.is_deliverable(address, &business.delivery_area).await)
    }

    async fn ensure_deliverable(&self, business: &Business, customer: &CustomerDetails) -> Result<(), CheckoutApiError> {
        let result = self.matcher.is_deliverable(&ShippingAddress::from(customer), &business.delivery_area).await;
        if result.deliverable {
            trace!("🛒️ {} delivers to {} (zones {:?})", business.slug, customer.postal_code, result.matched_zones);
            Ok(())
        } else {
            let reason = result.reason.unwrap_or_default();
            debug!("🛒️ {} does not deliver to {}. {reason}", business.slug, customer.postal_code);
            Err(CheckoutApiError::DeliveryIneligible { reason, suggestions: business.delivery_area.clone() })
        }
    }

    /// Creates an online order and registers it with the merchant's payment gateway.
    ///
    /// The order is written as `pending_payment` *before* the gateway is called, so that a payment can never arrive
    /// for an order we have no record of. The gateway is asked for the full payer-facing total, with our internal order
    /// id as the receipt.
    ///
    /// If an identical attempt (same business, items and buyer details) is still pending within the reuse window, its gateway
    /// order is returned instead of registering a new one.
    pub async fn create_remote_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<RemoteOrder, CheckoutApiError> {
        let business = self.business(slug).await?;
        let credentials = business.gateway_credentials().ok_or(CheckoutApiError::GatewayNotConfigured)?;
        self.ensure_deliverable(&business, &customer).await?;
        let intent = build_intent(items, customer)?;
        let fingerprint = intent_fingerprint(business.id, &intent.line_items, &intent.customer);

        if let Some(order) = self.reusable_order(business.id, &fingerprint, &intent.customer).await? {
            info!("🛒️ Reusing pending order {} for an identical checkout attempt at {slug}", order.order_id);
            return remote_order_for(&business, &credentials.key_id, order, true);
        }

        let new_order = online_order(&business, intent, fingerprint);
        let order = self.db.insert_order(new_order).await?;
        debug!("🛒️ Order {} for {} created as pending payment", order.order_id, order.total_amount);
        let remote = self
            .gateway
            .create_order(&credentials, order.total_amount, &order.currency, &order.order_id)
            .await
            .map_err(|e| {
                warn!("🛒️ Could not register order {} with the payment gateway. {e}", order.order_id);
                CheckoutApiError::GatewayUnavailable(e.to_string())
            })?;
        let order = self.db.attach_gateway_order(&order.order_id, &remote.id).await?;
        info!("🛒️ Order {} registered with the gateway as {}", order.order_id, remote.id);
        remote_order_for(&business, &credentials.key_id, order, false)
    }

    /// A pending order for the same attempt, still inside the reuse window and addressed to exactly the same buyer.
    async fn reusable_order(
        &self,
        business_id: i64,
        fingerprint: &str,
        customer: &CustomerDetails,
    ) -> Result<Option<Order>, CheckoutApiError> {
        if self.reuse_window <= Duration::zero() {
            return Ok(None);
        }
        let cutoff = Utc::now() - self.reuse_window;
        let order = self.db.fetch_pending_order_by_fingerprint(business_id, fingerprint).await?;
        Ok(order.filter(|o| o.created_at >= cutoff && &o.customer == customer))
    }

    /// Settles an online order after the buyer's payment sheet reports success.
    ///
    /// The signature must be the gateway's HMAC of `"{gateway_order_id}|{gateway_payment_id}"` under the merchant's key
    /// secret. On a mismatch nothing is written. A repeated completion for an order that is already paid is a no-op
    /// that returns the paid order.
    pub async fn complete_order(&self, slug: &str, completion: PaymentCompletion) -> Result<Order, CheckoutApiError> {
        let business = self.business(slug).await?;
        let credentials = business.gateway_credentials().ok_or(CheckoutApiError::GatewayNotConfigured)?;
        let PaymentCompletion { gateway_order_id, gateway_payment_id, signature } = completion;
        if !verify_payment_signature(
            credentials.key_secret.reveal(),
            &gateway_order_id,
            &gateway_payment_id,
            &signature,
        ) {
            warn!(
                "🔐️ Payment signature mismatch for gateway order {gateway_order_id} (payment {gateway_payment_id}) at \
                 {slug}. The order was not changed."
            );
            return Err(CheckoutApiError::SignatureInvalid);
        }
        let transition = self
            .db
            .mark_order_paid(Some(business.id), &gateway_order_id, &gateway_payment_id, Some(&signature))
            .await
            .map_err(|e| payment_not_recorded(&gateway_order_id, &gateway_payment_id, e.to_string()))?
            .ok_or_else(|| CheckoutApiError::OrderNotFound(gateway_order_id.clone()))?;
        self.settled(&business, transition).await
    }

    /// Settles an online order from a gateway `payment.captured` webhook.
    ///
    /// The webhook body has already been authenticated by the caller. The captured amount must equal the order total.
    pub async fn confirm_captured_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        amount: Paise,
    ) -> Result<Order, CheckoutApiError> {
        let order = self
            .db
            .fetch_order_by_gateway_order_id(gateway_order_id)
            .await?
            .ok_or_else(|| CheckoutApiError::OrderNotFound(gateway_order_id.to_string()))?;
        if order.total_amount != amount {
            error!(
                "💳️ Gateway reported {amount} captured for order {}, which totals {}. Not marking it as paid.",
                order.order_id, order.total_amount
            );
            return Err(CheckoutApiError::InvalidAmount(format!(
                "Captured amount {amount} does not match the order total {}",
                order.total_amount
            )));
        }
        let business = self
            .db
            .fetch_business_by_id(order.business_id)
            .await?
            .ok_or_else(|| CheckoutApiError::BusinessNotFound(order.business_id.to_string()))?;
        let transition = self
            .db
            .mark_order_paid(Some(business.id), gateway_order_id, gateway_payment_id, None)
            .await
            .map_err(|e| payment_not_recorded(gateway_order_id, gateway_payment_id, e.to_string()))?
            .ok_or_else(|| CheckoutApiError::OrderNotFound(gateway_order_id.to_string()))?;
        self.settled(&business, transition).await
    }

    async fn settled(&self, business: &Business, transition: PaidTransition) -> Result<Order, CheckoutApiError> {
        let PaidTransition { order, newly_paid } = transition;
        if newly_paid {
            info!("💳️ Order {} at {} is paid ({})", order.order_id, business.slug, order.total_amount);
            self.call_order_paid_hook(&order, business).await;
        } else {
            debug!("💳️ Order {} was already {}. Duplicate completion ignored.", order.order_id, order.status);
        }
        Ok(order)
    }

    async fn call_order_paid_hook(&self, order: &Order, business: &Business) {
        for emitter in &self.producers.order_paid_producer {
            debug!("💳️ Notifying order paid hook subscribers");
            emitter.publish_event(OrderPaidEvent::new(order.clone(), business)).await;
        }
    }

    /// Commits a cash-on-delivery order. No gateway is involved.
    pub async fn create_cash_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<Order, CheckoutApiError> {
        let business = self.business(slug).await?;
        self.ensure_deliverable(&business, &customer).await?;
        let intent = build_intent(items, customer)?;
        let mut new_order = NewOrder::new(business.id, PaymentMethod::Cash, intent.total());
        apply_intent(&mut new_order, intent);
        let order = self.db.insert_order(new_order).await?;
        info!("💵️ Cash order {} for {} committed at {slug}", order.order_id, order.total_amount);
        for emitter in &self.producers.cash_order_created_producer {
            debug!("💵️ Notifying cash order hook subscribers");
            emitter.publish_event(CashOrderCreatedEvent::new(order.clone(), &business)).await;
        }
        Ok(order)
    }

    /// Looks up an order by its internal id. Orders of other businesses are reported as not found.
    pub async fn fetch_order(&self, slug: &str, order_id: &OrderId) -> Result<Order, CheckoutApiError> {
        let business = self.business(slug).await?;
        self.db
            .fetch_order_by_order_id(order_id)
            .await?
            .filter(|o| o.business_id == business.id)
            .ok_or_else(|| CheckoutApiError::OrderNotFound(order_id.as_str().to_string()))
    }
}

fn apply_intent(order: &mut NewOrder, intent: OrderIntent) {
    order.total_amount = intent.breakdown.total;
    order.platform_fee = intent.breakdown.platform_fee;
    order.seller_amount = intent.breakdown.seller_amount;
    order.line_items = intent.line_items;
    order.customer = intent.customer;
}

fn online_order(business: &Business, intent: OrderIntent, fingerprint: String) -> NewOrder {
    let mut order = NewOrder::new(business.id, PaymentMethod::Online, intent.total());
    order.intent_fingerprint = Some(fingerprint);
    apply_intent(&mut order, intent);
    order
}

fn remote_order_for(
    business: &Business,
    key_id: &str,
    order: Order,
    reused: bool,
) -> Result<RemoteOrder, CheckoutApiError> {
    let gateway_order_id = order
        .gateway_order_id
        .clone()
        .ok_or_else(|| CheckoutApiError::PersistenceFailure(format!("Order {} has no gateway order", order.order_id)))?;
    Ok(RemoteOrder {
        gateway_order_id,
        gateway_public_key: key_id.to_string(),
        amount: order.total_amount,
        currency: order.currency.clone(),
        internal_order_id: order.order_id.clone(),
        breakdown: PriceBreakdown {
            total: order.total_amount,
            platform_fee: order.platform_fee,
            seller_amount: order.seller_amount,
        },
        business_name: business.name.clone(),
        reused,
    })
}

fn payment_not_recorded(gateway_order_id: &str, payment_id: &str, reason: String) -> CheckoutApiError {
    error!(
        "💳️ Payment {payment_id} for gateway order {gateway_order_id} was verified but could not be recorded. \
         Manual reconciliation is required. {reason}"
    );
    CheckoutApiError::PersistenceFailure(reason)
}
