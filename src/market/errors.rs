//! Error definitions for the perp exchange
use odra::prelude::*;

/// Custom errors for the perp exchange contract
#[odra::odra_error]
pub enum MarketError {
    /// Pool has no liquidity for the requested operation
    InsufficientLiquidity = 1,

    /// Trade would move the mark price beyond the allowed band
    PriceLimitExceeded = 2,

    /// Trading is disabled for this market
    MarketDisallowed = 3,

    /// Account collateral does not cover the withdrawal
    InsufficientCollateral = 4,

    /// Provider owns less liquidity than requested
    InsufficientLiquidityBalance = 5,

    /// Liquidity provision too small to mint
    InsufficientLiquidityMinted = 6,

    /// Liquidity removal yields nothing
    InsufficientLiquidityBurned = 7,

    /// Attached native value does not match the declared amount
    NativeValueMismatch = 8,

    /// Settlement token transfer failed
    TransferFailed = 9,

    /// Unauthorized access
    Unauthorized = 10,

    /// Zero amount provided
    InvalidAmount = 11,

    /// Overflow error
    Overflow = 12,

    /// Underflow error
    Underflow = 13,

    /// Division by zero
    DivisionByZero = 14,
}
