//! The buyer-facing checkout state machine.
//!
//! ```text
//!  CollectingAddress --submit_address--> SelectingPayment --pay--> Processing --> Done
//!          ^                                 |    ^                    |
//!          +-------------back----------------+    +--failed/dismissed--+
//!
//!  dismiss: CollectingAddress | SelectingPayment --> Cancelled
//!           Processing --> Cancelled, the gateway order stays pending and can still be settled by a late callback
//! ```
//!
//! The flow owns no I/O of its own. It talks to the server through a [`CheckoutBackend`], shows the gateway's hosted
//! payment sheet through a [`PaymentSheet`], and remembers the buyer's details through a [`SessionStore`].
use chrono::{DateTime, Duration, Utc};
use log::*;
use thiserror::Error;

use crate::{
    db_types::{CartLineItem, CustomerDetails, Order, PaymentMethod},
    sfe_api::{
        checkout_api::CheckoutApi,
        checkout_objects::{PaymentCompletion, RemoteOrder},
        delivery::{local_deliverability, ShippingAddress},
        errors::CheckoutApiError,
        intent::{build_intent, OrderIntent},
    },
    traits::{Geocoder, PaymentGateway, StorefrontDatabase},
};

/// Buyer details are remembered for a year, purely as a convenience.
pub const CUSTOMER_CACHE_TTL_DAYS: i64 = 365;

//--------------------------------------         Ports         ---------------------------------------------------------
/// The server-side operations the flow drives.
#[allow(async_fn_in_trait)]
pub trait CheckoutBackend {
    async fn create_remote_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<RemoteOrder, CheckoutApiError>;

    async fn complete_order(&self, slug: &str, completion: PaymentCompletion) -> Result<Order, CheckoutApiError>;

    async fn create_cash_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<Order, CheckoutApiError>;
}

impl<B, G, Z> CheckoutBackend for CheckoutApi<B, G, Z>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    async fn create_remote_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<RemoteOrder, CheckoutApiError> {
        CheckoutApi::create_remote_order(self, slug, items, customer).await
    }

    async fn complete_order(&self, slug: &str, completion: PaymentCompletion) -> Result<Order, CheckoutApiError> {
        CheckoutApi::complete_order(self, slug, completion).await
    }

    async fn create_cash_order(
        &self,
        slug: &str,
        items: Vec<CartLineItem>,
        customer: CustomerDetails,
    ) -> Result<Order, CheckoutApiError> {
        CheckoutApi::create_cash_order(self, slug, items, customer).await
    }
}

/// What the gateway's payment sheet reported when it closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSheetOutcome {
    Succeeded { payment_id: String, signature: String },
    Failed { reason: String },
    Dismissed,
}

/// The gateway's hosted payment UI. Presenting it is the single point where checkout waits on the buyer.
#[allow(async_fn_in_trait)]
pub trait PaymentSheet {
    async fn present(&self, order: &RemoteOrder, prefill: &CustomerDetails) -> PaymentSheetOutcome;
}

/// Client-side storage for the buyer's details.
pub trait SessionStore {
    /// The remembered details, unless they have expired.
    fn load_customer(&self) -> Option<CustomerDetails>;

    fn save_customer(&mut self, customer: &CustomerDetails, expires_at: DateTime<Utc>);
}

/// A [`SessionStore`] that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entry: Option<(CustomerDetails, DateTime<Utc>)>,
}

impl SessionStore for InMemorySessionStore {
    fn load_customer(&self) -> Option<CustomerDetails> {
        self.entry.as_ref().filter(|(_, expiry)| *expiry > Utc::now()).map(|(c, _)| c.clone())
    }

    fn save_customer(&mut self, customer: &CustomerDetails, expires_at: DateTime<Utc>) {
        self.entry = Some((customer.clone(), expires_at));
    }
}

//--------------------------------------     Session/State     ---------------------------------------------------------
/// Everything the flow needs to know about the storefront and the cart.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    pub slug: String,
    pub delivery_area: Vec<String>,
    pub items: Vec<CartLineItem>,
    /// Details the buyer entered on an earlier visit, if the caller already has them
    pub customer: Option<CustomerDetails>,
}

impl CheckoutSession {
    pub fn new<S: Into<String>>(slug: S, delivery_area: Vec<String>, items: Vec<CartLineItem>) -> Self {
        Self { slug: slug.into(), delivery_area, items, customer: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    CollectingAddress,
    SelectingPayment,
    Processing { method: PaymentMethod },
    Done { order: Box<Order> },
    Cancelled,
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::CollectingAddress => "collecting address",
            CheckoutState::SelectingPayment => "selecting payment",
            CheckoutState::Processing { .. } => "processing",
            CheckoutState::Done { .. } => "done",
            CheckoutState::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissOutcome {
    /// Nothing had been sent to the gateway
    Cancelled,
    /// A gateway order had been dispatched. It remains `pending_payment` and a late callback can still settle it.
    Detached { gateway_order_id: String },
    /// The order was already placed
    AlreadyDone,
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutFlowError {
    #[error(transparent)]
    Checkout(#[from] CheckoutApiError),
    #[error("The payment failed. {0}")]
    PaymentFailed(String),
    #[error("The payment was cancelled")]
    PaymentDismissed,
    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    /// The payment sheet reported success but the order could not be settled. The money has moved.
    #[error("Your payment went through but has not been recorded yet. {0}")]
    PaymentNotRecorded(CheckoutApiError),
}

//--------------------------------------     CheckoutFlow      ---------------------------------------------------------
pub struct CheckoutFlow<K, P, S> {
    backend: K,
    sheet: P,
    store: S,
    session: CheckoutSession,
    state: CheckoutState,
    intent: Option<OrderIntent>,
    dispatched: Option<RemoteOrder>,
}

impl<K, P, S> CheckoutFlow<K, P, S>
where
    K: CheckoutBackend,
    P: PaymentSheet,
    S: SessionStore,
{
    pub fn new(backend: K, sheet: P, store: S, mut session: CheckoutSession) -> Self {
        if session.customer.is_none() {
            session.customer = store.load_customer();
        }
        Self {
            backend,
            sheet,
            store,
            session,
            state: CheckoutState::CollectingAddress,
            intent: None,
            dispatched: None,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Details to pre-fill the address form with.
    pub fn prefill(&self) -> Option<&CustomerDetails> {
        self.session.customer.as_ref()
    }

    /// The priced intent, once the address has been accepted.
    pub fn intent(&self) -> Option<&OrderIntent> {
        self.intent.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The gateway order registered by the latest online attempt, if it got that far.
    pub fn dispatched(&self) -> Option<&RemoteOrder> {
        self.dispatched.as_ref()
    }

    fn invalid(&self, action: &'static str) -> CheckoutFlowError {
        CheckoutFlowError::InvalidTransition { action, state: self.state.name() }
    }

    /// Validates the buyer's details and checks, without any I/O, that the merchant delivers there.
    ///
    /// When the address is outside the delivery area, the error carries the merchant's zones so they can be offered
    /// as quick-fill suggestions.
    pub fn submit_address(&mut self, details: CustomerDetails) -> Result<&OrderIntent, CheckoutFlowError> {
        if self.state != CheckoutState::CollectingAddress {
            return Err(self.invalid("submit an address"));
        }
        let intent = build_intent(self.session.items.clone(), details)?;
        let result = local_deliverability(&ShippingAddress::from(&intent.customer), &self.session.delivery_area);
        if !result.deliverable {
            debug!("🧾️ Address at {} is outside the delivery area of {}", intent.customer.postal_code, self.session.slug);
            let suggestions = self
                .session
                .delivery_area
                .iter()
                .map(|z| z.trim().to_string())
                .filter(|z| !z.is_empty())
                .collect();
            let reason = result.reason.unwrap_or_default();
            return Err(CheckoutApiError::DeliveryIneligible { reason, suggestions }.into());
        }
        let expires_at = Utc::now() + Duration::days(CUSTOMER_CACHE_TTL_DAYS);
        self.store.save_customer(&intent.customer, expires_at);
        self.session.customer = Some(intent.customer.clone());
        self.state = CheckoutState::SelectingPayment;
        Ok(self.intent.insert(intent))
    }

    pub fn back(&mut self) -> Result<(), CheckoutFlowError> {
        if self.state != CheckoutState::SelectingPayment {
            return Err(self.invalid("go back"));
        }
        self.state = CheckoutState::CollectingAddress;
        Ok(())
    }

    /// Places the order with the chosen payment method.
    ///
    /// Any failure before the gateway confirmed payment returns the flow to `SelectingPayment` so the buyer can try
    /// again, including store failures while creating the order. Only when the payment sheet reported success and the
    /// completion could not be recorded does the flow stay in `Processing`, so that the buyer does not pay twice.
    pub async fn pay(&mut self, method: PaymentMethod) -> Result<Order, CheckoutFlowError> {
        if self.state != CheckoutState::SelectingPayment {
            return Err(self.invalid("pay"));
        }
        let intent = self.intent.clone().ok_or_else(|| self.invalid("pay"))?;
        self.state = CheckoutState::Processing { method };
        self.dispatched = None;
        let result = match method {
            PaymentMethod::Cash => self
                .backend
                .create_cash_order(&self.session.slug, intent.line_items, intent.customer)
                .await
                .map_err(CheckoutFlowError::from),
            PaymentMethod::Online => self.pay_online(intent).await,
        };
        match result {
            Ok(order) => {
                info!("🧾️ Checkout at {} complete. Order {} is {}", self.session.slug, order.order_id, order.status);
                self.state = CheckoutState::Done { order: Box::new(order.clone()) };
                Ok(order)
            },
            Err(e @ CheckoutFlowError::PaymentNotRecorded(_)) => {
                error!("🧾️ Payment at {} went through but the order could not be recorded. {e}", self.session.slug);
                Err(e)
            },
            Err(e) => {
                debug!("🧾️ Payment attempt at {} did not complete. {e}", self.session.slug);
                self.state = CheckoutState::SelectingPayment;
                Err(e)
            },
        }
    }

    async fn pay_online(&mut self, intent: OrderIntent) -> Result<Order, CheckoutFlowError> {
        let slug = self.session.slug.clone();
        let remote = self.backend.create_remote_order(&slug, intent.line_items, intent.customer.clone()).await?;
        let gateway_order_id = remote.gateway_order_id.clone();
        let remote = self.dispatched.insert(remote);
        trace!("🧾️ Presenting payment sheet for gateway order {gateway_order_id}");
        let outcome = self.sheet.present(remote, &intent.customer).await;
        match outcome {
            PaymentSheetOutcome::Succeeded { payment_id, signature } => {
                let completion = PaymentCompletion { gateway_order_id, gateway_payment_id: payment_id, signature };
                match self.backend.complete_order(&slug, completion).await {
                    Ok(order) => Ok(order),
                    Err(e @ CheckoutApiError::PersistenceFailure(_)) => Err(CheckoutFlowError::PaymentNotRecorded(e)),
                    Err(e) => Err(e.into()),
                }
            },
            PaymentSheetOutcome::Failed { reason } => Err(CheckoutFlowError::PaymentFailed(reason)),
            PaymentSheetOutcome::Dismissed => Err(CheckoutFlowError::PaymentDismissed),
        }
    }

    /// The buyer walked away.
    pub fn dismiss(&mut self) -> DismissOutcome {
        let outcome = match &self.state {
            CheckoutState::Done { .. } => return DismissOutcome::AlreadyDone,
            CheckoutState::Processing { .. } => match self.dispatched.take() {
                Some(remote) => {
                    info!(
                        "🧾️ Checkout dismissed while processing. Gateway order {} is left pending.",
                        remote.gateway_order_id
                    );
                    DismissOutcome::Detached { gateway_order_id: remote.gateway_order_id }
                },
                None => DismissOutcome::Cancelled,
            },
            _ => DismissOutcome::Cancelled,
        };
        self.state = CheckoutState::Cancelled;
        outcome
    }
}
