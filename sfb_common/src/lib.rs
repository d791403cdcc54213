mod helpers;
mod paise;

pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use paise::{Paise, PaiseConversionError, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
