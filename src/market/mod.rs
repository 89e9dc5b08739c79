//! Perp exchange module
//!
//! The constant-product market the long token vault trades against,
//! together with the narrow `PerpMarket` interface vaults consume.

pub mod exchange;
pub mod errors;
pub mod events;

pub use exchange::{AccountInfo, PerpExchange};
pub use errors::MarketError;
pub use events::*;
