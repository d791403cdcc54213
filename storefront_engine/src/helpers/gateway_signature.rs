//! Payment gateway signatures.
//!
//! The gateway proves a payment to us in two ways:
//! * On the buyer's client, the payment sheet returns `(order_id, payment_id, signature)` where the signature is the
//!   hex HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with the merchant's key secret.
//! * Server-to-server webhooks carry the hex HMAC-SHA256 of the raw request body, keyed with the platform's webhook
//!   secret.
//!
//! All comparisons are constant-time.
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"))
}

fn verify_hex(mac: HmacSha256, signature: &str) -> bool {
    match hex::decode(signature.trim()) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// The hex-encoded payment signature the gateway issues for a completed payment.
pub fn calculate_payment_signature(key_secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let mut mac = mac_for(key_secret);
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_payment_signature(key_secret: &str, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
    let mut mac = mac_for(key_secret);
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    verify_hex(mac, signature)
}

/// The hex-encoded signature over a raw webhook body.
pub fn calculate_webhook_signature(webhook_secret: &str, body: &[u8]) -> String {
    let mut mac = mac_for(webhook_secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_webhook_signature(webhook_secret: &str, body: &[u8], signature: &str) -> bool {
    let mut mac = mac_for(webhook_secret);
    mac.update(body);
    verify_hex(mac, signature)
}
