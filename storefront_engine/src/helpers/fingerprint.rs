use sha2::{Digest, Sha256};

use crate::db_types::{CartLineItem, CustomerDetails};

/// A stable digest of a checkout attempt: the business, what is being bought and who is buying it.
///
/// Two attempts with the same fingerprint are the same purchase, shipped to the same person at the same address.
/// Line-item order does not matter.
pub fn intent_fingerprint(business_id: i64, items: &[CartLineItem], customer: &CustomerDetails) -> String {
    let mut lines = items
        .iter()
        .map(|i| format!("{}:{}:{}", i.product_id, i.unit_price.value(), i.quantity))
        .collect::<Vec<String>>();
    lines.sort();
    let mut hasher = Sha256::new();
    hasher.update(business_id.to_le_bytes());
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    let fields = [
        customer.name.as_str(),
        customer.phone.as_str(),
        customer.email.as_deref().unwrap_or_default(),
        customer.address.as_str(),
        customer.landmark.as_deref().unwrap_or_default(),
        customer.city.as_str(),
        customer.state.as_str(),
        customer.postal_code.as_str(),
    ];
    for field in fields {
        hasher.update(field.trim().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
