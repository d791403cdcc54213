use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sfb_common::Paise;

use crate::{
    db_types::{CartLineItem, CustomerDetails},
    sfe_api::{
        checkout_objects::{PriceBreakdown, ValidationErrors},
        errors::CheckoutApiError,
    },
};

/// The platform's cut of every order, in percent of the order total.
pub const PLATFORM_FEE_PERCENT: i64 = 5;
pub const MIN_ADDRESS_LENGTH: usize = 10;

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());
static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A validated, priced purchase. It exists only in memory: the persisted form is an `Order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub line_items: Vec<CartLineItem>,
    pub customer: CustomerDetails,
    pub breakdown: PriceBreakdown,
}

impl OrderIntent {
    pub fn total(&self) -> Paise {
        self.breakdown.total
    }
}

/// Checks every customer field and reports all failures at once.
pub fn validate_customer(customer: &CustomerDetails) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if customer.name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
    if !PHONE.is_match(customer.phone.trim()) {
        errors.push("phone", "Enter a valid 10-digit mobile number");
    }
    if let Some(email) = customer.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        if !EMAIL.is_match(email) {
            errors.push("email", "Enter a valid email address");
        }
    }
    if customer.address.trim().chars().count() < MIN_ADDRESS_LENGTH {
        errors.push("address", "Address must be at least 10 characters");
    }
    if customer.city.trim().is_empty() {
        errors.push("city", "City is required");
    }
    if customer.state.trim().is_empty() {
        errors.push("state", "State is required");
    }
    if !POSTAL_CODE.is_match(customer.postal_code.trim()) {
        errors.push("postal_code", "PIN code must be exactly 6 digits");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trims every field and drops blank optional fields.
pub fn normalize_customer(customer: CustomerDetails) -> CustomerDetails {
    let opt = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    CustomerDetails {
        name: customer.name.trim().to_string(),
        phone: customer.phone.trim().to_string(),
        email: opt(customer.email),
        address: customer.address.trim().to_string(),
        landmark: opt(customer.landmark),
        city: customer.city.trim().to_string(),
        state: customer.state.trim().to_string(),
        postal_code: customer.postal_code.trim().to_string(),
    }
}

/// Splits a total into the platform fee (rounded once, half-up) and the merchant's share.
pub fn price_breakdown(total: Paise) -> PriceBreakdown {
    let platform_fee = total.percentage(PLATFORM_FEE_PERCENT);
    PriceBreakdown { total, platform_fee, seller_amount: total - platform_fee }
}

fn order_total(items: &[CartLineItem]) -> Result<Paise, CheckoutApiError> {
    if items.is_empty() {
        return Err(CheckoutApiError::InvalidAmount("The cart is empty".into()));
    }
    items.iter().try_fold(Paise::default(), |total, item| {
        if item.quantity <= 0 {
            return Err(CheckoutApiError::InvalidAmount(format!("Quantity for '{}' must be positive", item.name)));
        }
        if item.unit_price.value() < 0 {
            return Err(CheckoutApiError::InvalidAmount(format!("Price for '{}' cannot be negative", item.name)));
        }
        item.unit_price
            .checked_mul(item.quantity)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| CheckoutApiError::InvalidAmount("Order total is too large".into()))
    })
}

/// Prices a cart for a customer.
///
/// Totals are always computed here from the line items. Whatever total a client may have displayed is never trusted.
pub fn build_intent(items: Vec<CartLineItem>, customer: CustomerDetails) -> Result<OrderIntent, CheckoutApiError> {
    let total = order_total(&items)?;
    if !total.is_positive() {
        return Err(CheckoutApiError::InvalidAmount("Order total must be greater than zero".into()));
    }
    let customer = normalize_customer(customer);
    validate_customer(&customer).map_err(CheckoutApiError::InvalidAddress)?;
    Ok(OrderIntent { line_items: items, customer, breakdown: price_breakdown(total) })
}
