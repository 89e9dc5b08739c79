//! Long token vault module
//!
//! A long token is an ERC-4626 style vault over a single perp market:
//! depositors supply the market's settlement asset and hold fungible shares
//! tracking a leveraged long position in the market's base asset.

pub mod long_token;
pub mod token_base;
pub mod errors;
pub mod events;

#[cfg(test)]
mod tests;

pub use long_token::LongToken;
pub use token_base::{Allowance, SettlementAsset, TokenBase};
pub use errors::VaultError;
pub use events::*;
