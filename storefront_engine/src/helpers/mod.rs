mod fingerprint;
mod gateway_signature;

pub use fingerprint::intent_fingerprint;
pub use gateway_signature::{
    calculate_payment_signature,
    calculate_webhook_signature,
    verify_payment_signature,
    verify_webhook_signature,
};
