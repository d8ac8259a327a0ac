//! Indexing logic: pure computations plus the store-backed building blocks
//! the event handlers are made of.

pub mod accounting;
pub mod builder;
pub mod classifier;
pub mod math;
pub mod registry;

pub use accounting::{next_cost_basis, update_long_short_prices, update_position};
pub use builder::{get_historical_event, make_transaction, make_transfer_transaction};
pub use classifier::{classify, is_deposit, is_open_close, is_withdraw, Classification};
pub use math::{
    convert_token_to_decimal, exponent_to_decimal, safe_div, sqrt_price_x96_to_token_prices,
};
pub use registry::fetch_or_create_token;
