mod helpers;
mod money;

pub mod op;
mod secret;

pub use helpers::{parse_boolean_flag, parse_id_list};
pub use money::{Money, MoneyParseError, CURRENCY_SYMBOL};
pub use secret::Secret;
