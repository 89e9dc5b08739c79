//! Event definitions for the perp exchange
use odra::prelude::*;
use odra::casper_types::U256;
use crate::math::Signed;

/// Event emitted when liquidity is added to the pool
#[odra::event]
pub struct LiquidityAdded {
    /// Address of the liquidity provider
    pub provider: Address,
    /// Amount of base added
    pub base: U256,
    /// Amount of quote added
    pub quote: U256,
    /// Liquidity units minted
    pub liquidity: U256,
}

/// Event emitted when liquidity is removed from the pool
#[odra::event]
pub struct LiquidityRemoved {
    /// Address of the liquidity provider
    pub provider: Address,
    /// Amount of base removed
    pub base: U256,
    /// Amount of quote removed
    pub quote: U256,
    /// Liquidity units burned
    pub liquidity: U256,
}

/// Event emitted when a position is opened or closed against the pool
#[odra::event]
pub struct PositionChanged {
    /// Trader whose position changed
    pub trader: Address,
    /// Realized base delta (positive: received base)
    pub base: Signed,
    /// Realized quote delta (positive: received quote)
    pub quote: Signed,
}

/// Event emitted when settlement collateral is deposited
#[odra::event]
pub struct CollateralDeposited {
    /// Depositing trader
    pub trader: Address,
    /// Amount of settlement asset deposited
    pub amount: U256,
}

/// Event emitted when settlement collateral is withdrawn
#[odra::event]
pub struct CollateralWithdrawn {
    /// Withdrawing trader
    pub trader: Address,
    /// Amount of settlement asset withdrawn
    pub amount: U256,
}
