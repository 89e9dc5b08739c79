//! Long token vault
//!
//! An ERC-4626 style vault whose shares track a leveraged long position in
//! one perp market. Deposited settlement assets become exchange collateral
//! and are traded quote-to-base against the pool; shares are minted from the
//! realized base delta, so the on-chain price impact is authoritative and
//! existing holders are never diluted by a depositor's imprecision.
//!
//! Rounding directions per entry point:
//! - `preview_deposit` / `preview_redeem` round outputs down
//! - `preview_mint` / `preview_withdraw` round required amounts up
//! - `convert_to_shares` / `convert_to_assets` use floor division
use odra::prelude::*;
use odra::casper_types::{U256, U512};
use odra::ContractRef;
use odra::UnwrapOrRevert;
use super::errors::VaultError;
use super::events::{Deposit, Withdraw};
use super::token_base::{SettlementAsset, TokenBase};
use crate::market::exchange::PerpMarketContractRef;
use crate::math::{SafeMath, PRICE_SCALE};
use crate::token::Cep18TokenContractRef;

/// Long token vault contract
#[odra::module]
pub struct LongToken {
    /// Share ledger, settlement configuration and trade validation
    base: SubModule<TokenBase>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LongToken {
    /// Bind the vault to an exchange.
    ///
    /// `native_wrapper` must be set exactly when the exchange settles in the
    /// native token; it is reported as the vault's asset in that mode.
    pub fn init(&mut self, exchange: Address, native_wrapper: Option<Address>) {
        self.base.init(exchange, native_wrapper);
        self.locked.set(false);
    }

    // ============ Share Token Surface ============

    pub fn name(&self) -> String {
        self.base.name()
    }

    pub fn symbol(&self) -> String {
        self.base.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.base.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.base.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.base.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.base.allowance(owner, spender)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.base.transfer(to, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.base.approve(spender, amount)
    }

    pub fn increase_allowance(&mut self, spender: Address, added: U256) -> bool {
        self.base.increase_allowance(spender, added)
    }

    pub fn decrease_allowance(&mut self, spender: Address, subtracted: U256) -> bool {
        self.base.decrease_allowance(spender, subtracted)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.base.transfer_from(from, to, amount)
    }

    // ============ Vault Metadata ============

    /// The asset depositors supply: the settlement token, or the configured
    /// wrapper under native settlement
    pub fn asset(&self) -> Address {
        match self.base.settlement_asset() {
            SettlementAsset::Token(token) => token,
            SettlementAsset::Native => self.base.native_wrapper().unwrap_or_revert(&self.env()),
        }
    }

    /// The exchange this vault trades against
    pub fn exchange(&self) -> Address {
        self.base.exchange()
    }

    /// Collateral balance held at the exchange, clamped at zero
    pub fn total_assets(&self) -> U256 {
        let self_addr = Address::from(self.env().self_address());
        let value = self.market().total_account_value(self_addr);
        if value.negative {
            U256::zero()
        } else {
            value.abs
        }
    }

    // ============ Conversions ============

    /// Shares a given amount of assets is worth at the current ratio.
    ///
    /// With no supply the pool's mark price answers instead; an empty pool
    /// propagates the market's math error.
    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        let supply = self.total_supply();
        if supply.is_zero() {
            let price = self.market().mark_price();
            return SafeMath::mul_div(assets, U256::from(PRICE_SCALE), price)
                .unwrap_or_revert_with(&self.env(), VaultError::ConversionOverflow);
        }
        let total_assets = self.total_assets();
        if total_assets.is_zero() {
            self.env().revert(VaultError::ZeroTotalAssets);
        }
        SafeMath::mul_div(assets, supply, total_assets)
            .unwrap_or_revert_with(&self.env(), VaultError::ConversionOverflow)
    }

    /// Assets a given amount of shares is worth at the current ratio
    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        let supply = self.total_supply();
        if supply.is_zero() {
            let price = self.market().mark_price();
            return SafeMath::mul_div(shares, price, U256::from(PRICE_SCALE))
                .unwrap_or_revert_with(&self.env(), VaultError::ConversionOverflow);
        }
        SafeMath::mul_div(shares, self.total_assets(), supply)
            .unwrap_or_revert_with(&self.env(), VaultError::ConversionOverflow)
    }

    // ============ Previews ============

    /// Shares minted by depositing `assets`, including price impact
    pub fn preview_deposit(&self, assets: U256) -> U256 {
        if assets.is_zero() {
            return U256::zero();
        }
        let (base, _) = self.market().preview_open_position(false, true, assets);
        base.abs
    }

    /// Assets required to mint exactly `shares`, rounded up
    pub fn preview_mint(&self, shares: U256) -> U256 {
        if shares.is_zero() {
            return U256::zero();
        }
        let (_, quote) = self.market().preview_open_position(false, false, shares);
        quote.abs
    }

    /// Shares burned to withdraw exactly `assets`, rounded up
    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        if assets.is_zero() {
            return U256::zero();
        }
        let (base, _) = self.market().preview_open_position(true, false, assets);
        base.abs
    }

    /// Assets returned by redeeming `shares`, including price impact
    pub fn preview_redeem(&self, shares: U256) -> U256 {
        if shares.is_zero() {
            return U256::zero();
        }
        let (_, quote) = self.market().preview_open_position(true, true, shares);
        quote.abs
    }

    // ============ Limits ============

    /// Largest deposit the pool's price band accepts; zero when the market
    /// is disallowed or the pool empty
    pub fn max_deposit(&self, _receiver: Address) -> U256 {
        self.market().max_open_position(false, true)
    }

    /// Largest mint the pool's price band accepts, in shares
    pub fn max_mint(&self, _receiver: Address) -> U256 {
        self.market().max_open_position(false, false)
    }

    /// Assets the owner can withdraw: the owner's convertible balance capped
    /// by the pool's closing-trade bound
    pub fn max_withdraw(&self, owner: Address) -> U256 {
        let cap = self.market().max_open_position(true, false);
        if cap.is_zero() || self.total_supply().is_zero() {
            return U256::zero();
        }
        SafeMath::min(self.convert_to_assets(self.balance_of(owner)), cap)
    }

    /// Shares the owner can redeem, capped the same way
    pub fn max_redeem(&self, owner: Address) -> U256 {
        let cap = self.market().max_open_position(true, true);
        if cap.is_zero() {
            return U256::zero();
        }
        SafeMath::min(self.balance_of(owner), cap)
    }

    // ============ Actions: Token Settlement ============

    /// Deposit `assets` settlement tokens and mint the realized shares to
    /// `receiver`. Returns the shares minted.
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        self.lock();
        self.only_token_settlement();
        let caller = self.env().caller();

        if assets.is_zero() {
            self.env().revert(VaultError::DepositIsZero);
        }
        if assets > self.max_deposit(receiver) {
            self.env().revert(VaultError::DepositMoreThanMax);
        }

        self.pull_and_collateralize(caller, assets);
        let shares = self.open_long(assets);
        self.base.mint(receiver, shares);

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });

        self.unlock();
        shares
    }

    /// Mint exactly `shares` to `receiver`, pulling the required assets from
    /// the caller. Returns the assets deposited.
    pub fn mint(&mut self, shares: U256, receiver: Address) -> U256 {
        self.lock();
        self.only_token_settlement();
        let caller = self.env().caller();

        if shares.is_zero() {
            self.env().revert(VaultError::MintIsZero);
        }
        if shares > self.max_mint(receiver) {
            self.env().revert(VaultError::MintMoreThanMax);
        }

        let required = self.preview_mint(shares);
        self.pull_and_collateralize(caller, required);
        let assets = self.open_long_exact(shares);
        self.base.mint(receiver, shares);

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });

        self.unlock();
        assets
    }

    /// Burn the shares needed to send exactly `assets` to `receiver`.
    /// Returns the shares burned.
    pub fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        self.only_token_settlement();
        let caller = self.env().caller();

        if assets.is_zero() {
            self.env().revert(VaultError::WithdrawIsZero);
        }
        if assets > self.max_withdraw(owner) {
            self.env().revert(VaultError::WithdrawMoreThanMax);
        }

        let shares = self.close_long_exact(assets);
        self.settle_shares(caller, owner, shares);
        self.collect_and_pay(receiver, assets);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets,
            shares,
        });

        self.unlock();
        shares
    }

    /// Burn exactly `shares` and send the realized assets to `receiver`.
    /// Returns the assets withdrawn.
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        self.only_token_settlement();
        let caller = self.env().caller();

        if shares.is_zero() {
            self.env().revert(VaultError::RedeemIsZero);
        }
        if shares > self.max_redeem(owner) {
            self.env().revert(VaultError::RedeemMoreThanMax);
        }

        let assets = self.close_long(shares);
        self.settle_shares(caller, owner, shares);
        self.collect_and_pay(receiver, assets);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets,
            shares,
        });

        self.unlock();
        assets
    }

    // ============ Actions: Native Settlement ============

    /// Deposit the attached native value and mint the realized shares
    #[odra(payable)]
    pub fn deposit_native(&mut self, receiver: Address) -> U256 {
        self.lock();
        self.only_native_settlement();
        let caller = self.env().caller();

        let attached = self.env().attached_value();
        let assets = U256::from(attached.as_u128());
        if assets.is_zero() {
            self.env().revert(VaultError::DepositIsZero);
        }
        if assets > self.max_deposit(receiver) {
            self.env().revert(VaultError::DepositMoreThanMax);
        }

        self.forward_native_collateral(attached, assets);
        let shares = self.open_long(assets);
        self.base.mint(receiver, shares);

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });

        self.unlock();
        shares
    }

    /// Mint exactly `shares` from the attached native value, refunding the
    /// surplus to the caller
    #[odra(payable)]
    pub fn mint_native(&mut self, shares: U256, receiver: Address) -> U256 {
        self.lock();
        self.only_native_settlement();
        let caller = self.env().caller();

        if shares.is_zero() {
            self.env().revert(VaultError::MintIsZero);
        }
        if shares > self.max_mint(receiver) {
            self.env().revert(VaultError::MintMoreThanMax);
        }

        let attached = U256::from(self.env().attached_value().as_u128());
        let required = self.preview_mint(shares);
        if attached < required {
            self.env().revert(VaultError::InsufficientNativeValue);
        }

        self.forward_native_collateral(U512::from(required.as_u128()), required);
        let assets = self.open_long_exact(shares);
        self.base.mint(receiver, shares);

        let refund = attached - assets;
        if !refund.is_zero() {
            self.env()
                .transfer_tokens(&caller, &U512::from(refund.as_u128()));
        }

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });

        self.unlock();
        assets
    }

    /// Burn the shares needed to send exactly `assets` of native value
    pub fn withdraw_native(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        self.only_native_settlement();
        let caller = self.env().caller();

        if assets.is_zero() {
            self.env().revert(VaultError::WithdrawIsZero);
        }
        if assets > self.max_withdraw(owner) {
            self.env().revert(VaultError::WithdrawMoreThanMax);
        }

        let shares = self.close_long_exact(assets);
        self.settle_shares(caller, owner, shares);
        self.collect_and_pay(receiver, assets);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets,
            shares,
        });

        self.unlock();
        shares
    }

    /// Burn exactly `shares` and send the realized native value
    pub fn redeem_native(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        self.only_native_settlement();
        let caller = self.env().caller();

        if shares.is_zero() {
            self.env().revert(VaultError::RedeemIsZero);
        }
        if shares > self.max_redeem(owner) {
            self.env().revert(VaultError::RedeemMoreThanMax);
        }

        let assets = self.close_long(shares);
        self.settle_shares(caller, owner, shares);
        self.collect_and_pay(receiver, assets);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets,
            shares,
        });

        self.unlock();
        assets
    }

    // ============ Internal Functions ============

    fn market(&self) -> PerpMarketContractRef {
        PerpMarketContractRef::new(self.env(), self.base.exchange())
    }

    /// Buy base with an exact quote input; returns the realized shares
    fn open_long(&mut self, assets: U256) -> U256 {
        let (base, quote) = self.market().open_position(false, true, assets);
        self.base
            .validate_open_position_result(false, true, assets, base.clone(), quote);
        base.abs
    }

    /// Buy an exact base output; returns the realized quote spent
    fn open_long_exact(&mut self, shares: U256) -> U256 {
        let (base, quote) = self.market().open_position(false, false, shares);
        self.base
            .validate_open_position_result(false, false, shares, base, quote.clone());
        quote.abs
    }

    /// Sell base for an exact quote output; returns the realized shares burned
    fn close_long_exact(&mut self, assets: U256) -> U256 {
        let (base, quote) = self.market().open_position(true, false, assets);
        self.base
            .validate_open_position_result(true, false, assets, base.clone(), quote);
        base.abs
    }

    /// Sell an exact base input; returns the realized quote received
    fn close_long(&mut self, shares: U256) -> U256 {
        let (base, quote) = self.market().open_position(true, true, shares);
        self.base
            .validate_open_position_result(true, true, shares, base, quote.clone());
        quote.abs
    }

    /// Pull settlement tokens from `from` and deposit them as exchange
    /// collateral
    fn pull_and_collateralize(&mut self, from: Address, assets: U256) {
        let token = match self.base.settlement_asset() {
            SettlementAsset::Token(token) => token,
            SettlementAsset::Native => self.env().revert(VaultError::TokenNotAvailable),
        };
        let exchange = self.base.exchange();
        let self_addr = Address::from(self.env().self_address());

        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        if !token_ref.transfer_from(from, self_addr, assets) {
            self.env().revert(VaultError::TransferFailed);
        }
        token_ref.approve(exchange, assets);
        self.market().deposit_collateral(assets);
    }

    /// Forward attached native value to the exchange and credit it as
    /// collateral
    fn forward_native_collateral(&mut self, value: U512, assets: U256) {
        let exchange = self.base.exchange();
        self.env().transfer_tokens(&exchange, &value);
        self.market().deposit_collateral(assets);
    }

    /// Collect withdrawn collateral from the exchange and pay the receiver
    fn collect_and_pay(&mut self, receiver: Address, assets: U256) {
        self.market().withdraw_collateral(assets);
        match self.base.settlement_asset() {
            SettlementAsset::Token(token) => {
                let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
                if !token_ref.transfer(receiver, assets) {
                    self.env().revert(VaultError::TransferFailed);
                }
            }
            SettlementAsset::Native => {
                self.env()
                    .transfer_tokens(&receiver, &U512::from(assets.as_u128()));
            }
        }
    }

    /// Spend the caller's allowance when acting for another owner, then burn
    fn settle_shares(&mut self, caller: Address, owner: Address, shares: U256) {
        if caller != owner {
            self.base.spend_allowance(owner, caller, shares);
        }
        self.base.burn(owner, shares);
    }

    fn only_token_settlement(&self) {
        if matches!(self.base.settlement_asset(), SettlementAsset::Native) {
            self.env().revert(VaultError::TokenNotAvailable);
        }
    }

    fn only_native_settlement(&self) {
        if matches!(self.base.settlement_asset(), SettlementAsset::Token(_)) {
            self.env().revert(VaultError::NativeNotAvailable);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(VaultError::Locked);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }
}
