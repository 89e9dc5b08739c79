//! Perp exchange contract
//!
//! Holds a single constant-product market: a virtual base/quote pool that
//! traders open positions against, plus per-trader collateral accounts
//! denominated in the settlement asset. Liquidity is virtual (perp style):
//! providers mint liquidity units against the pool without transferring the
//! pool legs themselves.
//!
//! Vault contracts consume this through the narrow `PerpMarket` interface.
use odra::prelude::*;
use odra::casper_types::{U256, U512};
use odra::ContractRef;
use odra::UnwrapOrRevert;
use super::errors::MarketError;
use super::events::{
    CollateralDeposited, CollateralWithdrawn, LiquidityAdded, LiquidityRemoved, PositionChanged,
};
use crate::math::{PoolMath, SafeMath, Signed, MINIMUM_LIQUIDITY, PPM, PRICE_SCALE};
use crate::token::Cep18TokenContractRef;

/// Per-trader account state at the exchange
///
/// The quote leg of every trade settles straight into the collateral
/// balance, so only the base exposure is carried as an open position.
#[odra::odra_type]
pub struct AccountInfo {
    /// Settlement collateral balance; trades and funding debits can push it
    /// negative
    pub collateral_balance: Signed,
    /// Base leg of the open position
    pub base_position: Signed,
}

impl AccountInfo {
    pub fn empty() -> Self {
        Self {
            collateral_balance: Signed::zero(),
            base_position: Signed::zero(),
        }
    }
}

/// External interface of the perp market consumed by vault contracts
#[odra::external_contract]
pub trait PerpMarket {
    /// Settlement asset of the exchange; `None` means native
    fn settlement_token(&self) -> Option<Address>;

    /// Decimal precision of the quote leg
    fn quote_decimals(&self) -> u8;

    /// Symbol of the traded market, e.g. "USD"
    fn market_symbol(&self) -> String;

    /// Whether trading is currently allowed
    fn is_market_allowed(&self) -> bool;

    /// Current mark price (quote per base, 18 decimals)
    fn mark_price(&self) -> U256;

    /// Pool value backing the given amount of liquidity units
    fn get_liquidity_value(&self, liquidity: U256) -> (U256, U256);

    /// Collateral plus position value of a trader, in settlement units
    fn total_account_value(&self, trader: Address) -> Signed;

    /// Largest trade amount the price band allows for the given mode
    fn max_open_position(&self, is_base_to_quote: bool, is_exact_input: bool) -> U256;

    /// Simulate a trade without touching state
    fn preview_open_position(
        &self,
        is_base_to_quote: bool,
        is_exact_input: bool,
        amount: U256,
    ) -> (Signed, Signed);

    /// Execute a trade; returns the realized (base, quote) deltas
    fn open_position(
        &mut self,
        is_base_to_quote: bool,
        is_exact_input: bool,
        amount: U256,
    ) -> (Signed, Signed);

    /// Move settlement assets from the caller into its collateral account
    fn deposit_collateral(&mut self, amount: U256);

    /// Move settlement assets from the caller's collateral account back out
    fn withdraw_collateral(&mut self, amount: U256);
}

/// Perp exchange contract
#[odra::module]
pub struct PerpExchange {
    /// Settlement asset; `None` selects native settlement
    settlement_token: Var<Option<Address>>,
    /// Symbol of the traded market
    market_symbol: Var<String>,
    /// Quote decimal precision
    quote_decimals: Var<u8>,
    /// Whether trading is allowed
    market_allowed: Var<bool>,
    /// Pool fee in parts per million
    pool_fee_ratio: Var<u32>,
    /// Maximum mark price move per trade in parts per million
    price_limit_ratio: Var<u32>,
    /// Base reserve of the virtual pool
    pool_base: Var<U256>,
    /// Quote reserve of the virtual pool
    pool_quote: Var<U256>,
    /// Total liquidity units
    total_liquidity: Var<U256>,
    /// Liquidity units per provider
    liquidity: Mapping<Address, U256>,
    /// Trader accounts
    accounts: Mapping<Address, AccountInfo>,
    /// Native balance attributed to collateral, for receipt verification
    tracked_native: Var<U512>,
    /// Contract admin
    admin: Var<Address>,
}

#[odra::module]
impl PerpExchange {
    /// Initialize the exchange for one market
    pub fn init(&mut self, settlement_token: Option<Address>, market_symbol: String) {
        let caller = self.env().caller();
        self.settlement_token.set(settlement_token);
        self.market_symbol.set(market_symbol);
        self.quote_decimals.set(18);
        self.market_allowed.set(false);
        self.pool_fee_ratio.set(0);
        // 5% default band
        self.price_limit_ratio.set(50_000);
        self.pool_base.set(U256::zero());
        self.pool_quote.set(U256::zero());
        self.total_liquidity.set(U256::zero());
        self.tracked_native.set(U512::zero());
        self.admin.set(caller);
    }

    pub fn settlement_token(&self) -> Option<Address> {
        self.settlement_token.get_or_default()
    }

    pub fn quote_decimals(&self) -> u8 {
        self.quote_decimals.get_or_default()
    }

    pub fn market_symbol(&self) -> String {
        self.market_symbol.get_or_default()
    }

    pub fn is_market_allowed(&self) -> bool {
        self.market_allowed.get_or_default()
    }

    pub fn pool_fee_ratio(&self) -> u32 {
        self.pool_fee_ratio.get_or_default()
    }

    pub fn price_limit_ratio(&self) -> u32 {
        self.price_limit_ratio.get_or_default()
    }

    /// Current pool reserves (base, quote)
    pub fn pool_reserves(&self) -> (U256, U256) {
        (
            self.pool_base.get_or_default(),
            self.pool_quote.get_or_default(),
        )
    }

    pub fn total_liquidity(&self) -> U256 {
        self.total_liquidity.get_or_default()
    }

    pub fn liquidity_of(&self, provider: Address) -> U256 {
        self.liquidity.get(&provider).unwrap_or_default()
    }

    pub fn get_account_info(&self, trader: Address) -> AccountInfo {
        self.accounts.get(&trader).unwrap_or_else(AccountInfo::empty)
    }

    /// Current mark price (quote per base, 18 decimals)
    pub fn mark_price(&self) -> U256 {
        let (base, quote) = self.pool_reserves();
        SafeMath::mul_div(quote, U256::from(PRICE_SCALE), base)
            .unwrap_or_revert(&self.env())
    }

    /// Pool value backing the given amount of liquidity units
    pub fn get_liquidity_value(&self, liquidity: U256) -> (U256, U256) {
        let total = self.total_liquidity();
        if total.is_zero() {
            return (U256::zero(), U256::zero());
        }
        let (base, quote) = self.pool_reserves();
        (
            SafeMath::mul_div(liquidity, base, total).unwrap_or_revert(&self.env()),
            SafeMath::mul_div(liquidity, quote, total).unwrap_or_revert(&self.env()),
        )
    }

    /// Collateral plus position value of a trader, in settlement units
    ///
    /// The position leg is `basePosition * poolQuote / poolBase` with a single
    /// floor division on the magnitude.
    pub fn total_account_value(&self, trader: Address) -> Signed {
        let account = self.get_account_info(trader);
        let mut value = account.collateral_balance.clone();
        if !account.base_position.is_zero() {
            let (base, quote) = self.pool_reserves();
            let notional = account
                .base_position
                .mul_div(quote, base)
                .unwrap_or_revert_with(&self.env(), MarketError::DivisionByZero);
            value = value
                .checked_add(&notional)
                .unwrap_or_revert_with(&self.env(), MarketError::Overflow);
        }
        value
    }

    /// Largest trade amount the price band allows for the given mode
    ///
    /// Zero when the market is disallowed or the pool is empty. Never reverts.
    pub fn max_open_position(&self, is_base_to_quote: bool, is_exact_input: bool) -> U256 {
        if !self.is_market_allowed() {
            return U256::zero();
        }
        let (base, quote) = self.pool_reserves();
        if base.is_zero() || quote.is_zero() {
            return U256::zero();
        }
        let limit = self.price_limit_ratio.get_or_default() as u64;
        let fee = self.pool_fee_ratio.get_or_default();
        if is_base_to_quote {
            // selling base pushes the price down: (B / (B + db))^2 >= 1 - limit
            let root = SafeMath::sqrt(U256::from((PPM - limit) * PPM));
            let max_base_in = SafeMath::mul_div(
                base,
                U256::from(PPM) - root,
                root,
            )
            .unwrap_or_default();
            if is_exact_input {
                max_base_in
            } else {
                PoolMath::amount_out(max_base_in, base, quote, fee).unwrap_or_default()
            }
        } else {
            // buying base pushes the price up: ((Q + dq) / Q)^2 <= 1 + limit
            let root = SafeMath::sqrt(U256::from((PPM + limit) * PPM));
            let max_quote_in = SafeMath::mul_div(
                quote,
                root - U256::from(PPM),
                U256::from(PPM),
            )
            .unwrap_or_default();
            if is_exact_input {
                max_quote_in
            } else {
                PoolMath::amount_out(max_quote_in, quote, base, fee).unwrap_or_default()
            }
        }
    }

    /// Simulate a trade without touching state
    ///
    /// Returned deltas are from the trader's point of view: a positive leg is
    /// received, a negative leg is paid. No price band is applied here.
    pub fn preview_open_position(
        &self,
        is_base_to_quote: bool,
        is_exact_input: bool,
        amount: U256,
    ) -> (Signed, Signed) {
        let (base, quote) = self.pool_reserves();
        let fee = self.pool_fee_ratio.get_or_default();
        let result = match (is_base_to_quote, is_exact_input) {
            // sell base, exact base in
            (true, true) => PoolMath::amount_out(amount, base, quote, fee)
                .map(|out| (Signed::minus(amount), Signed::plus(out))),
            // sell base, exact quote out
            (true, false) => PoolMath::amount_in(amount, base, quote, fee)
                .map(|input| (Signed::minus(input), Signed::plus(amount))),
            // buy base, exact quote in
            (false, true) => PoolMath::amount_out(amount, quote, base, fee)
                .map(|out| (Signed::plus(out), Signed::minus(amount))),
            // buy base, exact base out
            (false, false) => PoolMath::amount_in(amount, quote, base, fee)
                .map(|input| (Signed::plus(amount), Signed::minus(input))),
        };
        result.unwrap_or_revert(&self.env())
    }

    /// Execute a trade; returns the realized (base, quote) deltas
    pub fn open_position(
        &mut self,
        is_base_to_quote: bool,
        is_exact_input: bool,
        amount: U256,
    ) -> (Signed, Signed) {
        if !self.is_market_allowed() {
            self.env().revert(MarketError::MarketDisallowed);
        }
        if amount.is_zero() {
            self.env().revert(MarketError::InvalidAmount);
        }
        if amount > self.max_open_position(is_base_to_quote, is_exact_input) {
            self.env().revert(MarketError::PriceLimitExceeded);
        }

        let (base_delta, quote_delta) =
            self.preview_open_position(is_base_to_quote, is_exact_input, amount);

        // whatever the trader receives leaves the pool, and vice versa
        let (pool_base, pool_quote) = self.pool_reserves();
        let new_base = Self::apply_to_reserve(&self.env(), pool_base, &base_delta);
        let new_quote = Self::apply_to_reserve(&self.env(), pool_quote, &quote_delta);
        self.pool_base.set(new_base);
        self.pool_quote.set(new_quote);

        let trader = self.env().caller();
        let mut account = self.get_account_info(trader);
        account.base_position = account
            .base_position
            .checked_add(&base_delta)
            .unwrap_or_revert_with(&self.env(), MarketError::Overflow);
        // the quote leg settles in the collateral currency
        account.collateral_balance = account
            .collateral_balance
            .checked_add(&quote_delta)
            .unwrap_or_revert_with(&self.env(), MarketError::Overflow);
        self.accounts.set(&trader, account);

        self.env().emit_event(PositionChanged {
            trader,
            base: base_delta.clone(),
            quote: quote_delta.clone(),
        });

        (base_delta, quote_delta)
    }

    /// Add virtual liquidity to the pool; returns the liquidity units minted
    pub fn add_liquidity(&mut self, base: U256, quote: U256) -> U256 {
        if base.is_zero() || quote.is_zero() {
            self.env().revert(MarketError::InvalidAmount);
        }

        let caller = self.env().caller();
        let (pool_base, pool_quote) = self.pool_reserves();
        let total = self.total_liquidity();

        let minted = PoolMath::liquidity_minted(base, quote, pool_base, pool_quote, total)
            .unwrap_or_revert(&self.env());

        if total.is_zero() {
            // the first provision permanently locks MINIMUM_LIQUIDITY units
            let self_addr = Address::from(self.env().self_address());
            self.liquidity
                .set(&self_addr, U256::from(MINIMUM_LIQUIDITY));
            self.total_liquidity
                .set(minted + U256::from(MINIMUM_LIQUIDITY));
        } else {
            self.total_liquidity.set(total + minted);
        }

        let provider_liquidity = self.liquidity_of(caller);
        self.liquidity.set(&caller, provider_liquidity + minted);

        self.pool_base
            .set(SafeMath::add(pool_base, base).unwrap_or_revert(&self.env()));
        self.pool_quote
            .set(SafeMath::add(pool_quote, quote).unwrap_or_revert(&self.env()));

        self.env().emit_event(LiquidityAdded {
            provider: caller,
            base,
            quote,
            liquidity: minted,
        });

        minted
    }

    /// Remove virtual liquidity; returns the (base, quote) released
    pub fn remove_liquidity(&mut self, liquidity: U256) -> (U256, U256) {
        let caller = self.env().caller();
        let owned = self.liquidity_of(caller);
        if owned < liquidity {
            self.env().revert(MarketError::InsufficientLiquidityBalance);
        }

        let (base_out, quote_out) = self.get_liquidity_value(liquidity);
        if base_out.is_zero() && quote_out.is_zero() {
            self.env().revert(MarketError::InsufficientLiquidityBurned);
        }

        let (pool_base, pool_quote) = self.pool_reserves();
        self.liquidity.set(&caller, owned - liquidity);
        self.total_liquidity.set(self.total_liquidity() - liquidity);
        self.pool_base
            .set(SafeMath::sub(pool_base, base_out).unwrap_or_revert(&self.env()));
        self.pool_quote
            .set(SafeMath::sub(pool_quote, quote_out).unwrap_or_revert(&self.env()));

        self.env().emit_event(LiquidityRemoved {
            provider: caller,
            base: base_out,
            quote: quote_out,
            liquidity,
        });

        (base_out, quote_out)
    }

    /// Move settlement assets from the caller into its collateral account
    ///
    /// Token settlement pulls via `transfer_from`; native settlement expects
    /// the caller to have transferred the native value beforehand, which is
    /// verified against the contract balance.
    pub fn deposit_collateral(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(MarketError::InvalidAmount);
        }
        let caller = self.env().caller();

        match self.settlement_token() {
            Some(token) => {
                let self_addr = Address::from(self.env().self_address());
                let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
                if !token_ref.transfer_from(caller, self_addr, amount) {
                    self.env().revert(MarketError::TransferFailed);
                }
            }
            None => {
                let tracked = self.tracked_native.get_or_default();
                let expected = tracked + U512::from(amount.as_u128());
                if self.env().self_balance() < expected {
                    self.env().revert(MarketError::NativeValueMismatch);
                }
                self.tracked_native.set(expected);
            }
        }

        let mut account = self.get_account_info(caller);
        account.collateral_balance = account
            .collateral_balance
            .checked_add(&Signed::plus(amount))
            .unwrap_or_revert_with(&self.env(), MarketError::Overflow);
        self.accounts.set(&caller, account);

        self.env().emit_event(CollateralDeposited {
            trader: caller,
            amount,
        });
    }

    /// Move settlement assets from the caller's collateral account back out
    pub fn withdraw_collateral(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(MarketError::InvalidAmount);
        }
        let caller = self.env().caller();

        let mut account = self.get_account_info(caller);
        if account.collateral_balance.negative || account.collateral_balance.abs < amount {
            self.env().revert(MarketError::InsufficientCollateral);
        }
        account.collateral_balance = account
            .collateral_balance
            .checked_sub(&Signed::plus(amount))
            .unwrap_or_revert_with(&self.env(), MarketError::Underflow);
        self.accounts.set(&caller, account);

        match self.settlement_token() {
            Some(token) => {
                let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
                if !token_ref.transfer(caller, amount) {
                    self.env().revert(MarketError::TransferFailed);
                }
            }
            None => {
                let value = U512::from(amount.as_u128());
                let tracked = self.tracked_native.get_or_default();
                self.tracked_native.set(tracked - value);
                self.env().transfer_tokens(&caller, &value);
            }
        }

        self.env().emit_event(CollateralWithdrawn {
            trader: caller,
            amount,
        });
    }

    // ============ Admin Functions ============

    pub fn set_is_market_allowed(&mut self, allowed: bool) {
        self.only_admin();
        self.market_allowed.set(allowed);
    }

    pub fn set_pool_fee_ratio(&mut self, fee_ppm: u32) {
        self.only_admin();
        self.pool_fee_ratio.set(fee_ppm);
    }

    pub fn set_price_limit_ratio(&mut self, limit_ppm: u32) {
        self.only_admin();
        self.price_limit_ratio.set(limit_ppm);
    }

    pub fn set_quote_decimals(&mut self, decimals: u8) {
        self.only_admin();
        self.quote_decimals.set(decimals);
    }

    /// Force a trader's collateral balance; lets tests model funding debits
    pub fn set_collateral_balance(&mut self, trader: Address, balance: Signed) {
        self.only_admin();
        let mut account = self.get_account_info(trader);
        account.collateral_balance = balance;
        self.accounts.set(&trader, account);
    }

    // ============ Internal Functions ============

    fn apply_to_reserve(env: &odra::ContractEnv, reserve: U256, trader_delta: &Signed) -> U256 {
        if trader_delta.negative {
            SafeMath::add(reserve, trader_delta.abs).unwrap_or_revert(env)
        } else {
            SafeMath::sub(reserve, trader_delta.abs).unwrap_or_revert(env)
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(MarketError::Unauthorized);
        if caller != admin {
            self.env().revert(MarketError::Unauthorized);
        }
    }
}
