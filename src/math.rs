//! Mathematical utilities for the perp long token contracts
//! Implements safe math, signed settlement amounts and constant-product pool formulas
use odra::casper_types::U256;
use crate::market::errors::MarketError;

/// Minimum liquidity that is locked forever to prevent division by zero
pub const MINIMUM_LIQUIDITY: u128 = 1000;

/// Denominator for ratios expressed in parts per million (pool fee, price limit)
pub const PPM: u64 = 1_000_000;

/// Fixed-point scale for mark prices (quote per base, 18 decimals)
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Sign-magnitude amount used for collateral balances, positions and trade deltas.
/// `casper_types` has no signed big integer, so the sign is carried explicitly.
/// Zero is always normalized to non-negative.
#[odra::odra_type]
pub struct Signed {
    /// True when the amount is below zero
    pub negative: bool,
    /// Magnitude of the amount
    pub abs: U256,
}

impl Signed {
    pub fn zero() -> Self {
        Self {
            negative: false,
            abs: U256::zero(),
        }
    }

    pub fn plus(abs: U256) -> Self {
        Self {
            negative: false,
            abs,
        }
    }

    pub fn minus(abs: U256) -> Self {
        Self {
            negative: !abs.is_zero(),
            abs,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.abs.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.abs.is_zero()
    }

    /// Signed addition with overflow check on the magnitude
    pub fn checked_add(&self, other: &Signed) -> Option<Signed> {
        if self.negative == other.negative {
            let abs = self.abs.checked_add(other.abs)?;
            Some(Signed {
                negative: self.negative && !abs.is_zero(),
                abs,
            })
        } else if self.abs >= other.abs {
            let abs = self.abs - other.abs;
            Some(Signed {
                negative: self.negative && !abs.is_zero(),
                abs,
            })
        } else {
            let abs = other.abs - self.abs;
            Some(Signed {
                negative: other.negative,
                abs,
            })
        }
    }

    /// Signed subtraction with overflow check on the magnitude
    pub fn checked_sub(&self, other: &Signed) -> Option<Signed> {
        self.checked_add(&Signed {
            negative: !other.negative && !other.abs.is_zero(),
            abs: other.abs,
        })
    }

    /// Multiplies the magnitude by `num / den` rounding towards zero, keeping the sign
    pub fn mul_div(&self, num: U256, den: U256) -> Option<Signed> {
        let abs = SafeMath::mul_div(self.abs, num, den).ok()?;
        Some(Signed {
            negative: self.negative && !abs.is_zero(),
            abs,
        })
    }
}

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, MarketError> {
        a.checked_add(b).ok_or(MarketError::Overflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, MarketError> {
        a.checked_sub(b).ok_or(MarketError::Underflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, MarketError> {
        a.checked_mul(b).ok_or(MarketError::Overflow)
    }

    /// Safe division with zero check
    pub fn div(a: U256, b: U256) -> Result<U256, MarketError> {
        if b.is_zero() {
            return Err(MarketError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// `a * b / den` rounded down
    pub fn mul_div(a: U256, b: U256, den: U256) -> Result<U256, MarketError> {
        Self::div(Self::mul(a, b)?, den)
    }

    /// `a * b / den` rounded up
    pub fn mul_div_ceil(a: U256, b: U256, den: U256) -> Result<U256, MarketError> {
        let product = Self::mul(a, b)?;
        if den.is_zero() {
            return Err(MarketError::DivisionByZero);
        }
        if product.is_zero() {
            return Ok(U256::zero());
        }
        Ok((product - U256::one()) / den + U256::one())
    }

    /// Integer square root using Newton's method (Babylonian method)
    pub fn sqrt(y: U256) -> U256 {
        if y > U256::from(3) {
            let mut z = y;
            let mut x = y / 2 + 1;
            while x < z {
                z = x;
                x = (y / x + x) / 2;
            }
            z
        } else if !y.is_zero() {
            U256::one()
        } else {
            U256::zero()
        }
    }

    /// Returns the minimum of two U256 values
    pub fn min(a: U256, b: U256) -> U256 {
        if a < b {
            a
        } else {
            b
        }
    }
}

/// Constant-product pool calculations shared by the exchange
///
/// Outputs round down and required inputs round up, so the pool never
/// pays out more than the curve allows. The pool fee is charged on the
/// input side in parts per million.
pub struct PoolMath;

impl PoolMath {
    /// Output amount for an exact-input trade against `x * y = k`
    pub fn amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_ppm: u32,
    ) -> Result<U256, MarketError> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(MarketError::InsufficientLiquidity);
        }
        let effective = SafeMath::mul_div(
            amount_in,
            U256::from(PPM - fee_ppm as u64),
            U256::from(PPM),
        )?;
        let numerator = SafeMath::mul(effective, reserve_out)?;
        let denominator = SafeMath::add(reserve_in, effective)?;
        SafeMath::div(numerator, denominator)
    }

    /// Input amount required for an exact-output trade against `x * y = k`
    ///
    /// Fails with `Underflow` when the requested output exceeds the reserve.
    pub fn amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_ppm: u32,
    ) -> Result<U256, MarketError> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(MarketError::InsufficientLiquidity);
        }
        let available = SafeMath::sub(reserve_out, amount_out)?;
        let gross = SafeMath::mul_div_ceil(reserve_in, amount_out, available)?;
        SafeMath::mul_div_ceil(
            gross,
            U256::from(PPM),
            U256::from(PPM - fee_ppm as u64),
        )
    }

    /// Liquidity minted for a provision of (`base`, `quote`)
    ///
    /// First provision: `sqrt(base * quote) - MINIMUM_LIQUIDITY`.
    /// Subsequent: `min(base * total / reserve_base, quote * total / reserve_quote)`.
    pub fn liquidity_minted(
        base: U256,
        quote: U256,
        reserve_base: U256,
        reserve_quote: U256,
        total_liquidity: U256,
    ) -> Result<U256, MarketError> {
        if total_liquidity.is_zero() {
            let liquidity = SafeMath::sqrt(SafeMath::mul(base, quote)?);
            let minimum = U256::from(MINIMUM_LIQUIDITY);
            if liquidity <= minimum {
                return Err(MarketError::InsufficientLiquidityMinted);
            }
            Ok(liquidity - minimum)
        } else {
            let by_base = SafeMath::mul_div(base, total_liquidity, reserve_base)?;
            let by_quote = SafeMath::mul_div(quote, total_liquidity, reserve_quote)?;
            Ok(SafeMath::min(by_base, by_quote))
        }
    }
}
