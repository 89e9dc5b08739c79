//! Share ledger and trade-result validation shared by vault tokens
//!
//! `TokenBase` owns the CEP-18 share bookkeeping, the settlement-asset
//! selection done at construction, and the consistency check applied to
//! every trade result coming back from the exchange.
use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use odra::UnwrapOrRevert;
use super::errors::VaultError;
use crate::errors::TokenError;
use crate::events::{Approval, Transfer};
use crate::market::exchange::PerpMarketContractRef;
use crate::math::Signed;
use crate::token::Cep18TokenContractRef;

/// Settlement asset of a vault, fixed at construction
pub enum SettlementAsset {
    /// The chain's native token
    Native,
    /// A CEP-18 token
    Token(Address),
}

/// Spending permission granted by an owner to a spender.
///
/// `Unlimited` is what an approval of `U256::MAX` becomes; spending against
/// it never decrements, so the no-decrement rule is a checked branch instead
/// of a numeric comparison at every call site.
pub enum Allowance {
    Finite(U256),
    Unlimited,
}

impl Allowance {
    pub fn from_raw(raw: U256) -> Self {
        if raw == U256::MAX {
            Allowance::Unlimited
        } else {
            Allowance::Finite(raw)
        }
    }

    pub fn to_raw(&self) -> U256 {
        match self {
            Allowance::Finite(amount) => *amount,
            Allowance::Unlimited => U256::MAX,
        }
    }
}

/// Validates that a completed trade matches the requested direction and mode.
///
/// Deltas are trader-signed: a positive leg was received, a negative leg paid.
/// Each failing cell has its own error so callers can tell exactly which leg
/// disagreed.
pub fn check_open_position_result(
    is_base_to_quote: bool,
    is_exact_input: bool,
    amount: U256,
    base: &Signed,
    quote: &Signed,
) -> Result<(), VaultError> {
    match (is_base_to_quote, is_exact_input) {
        (true, true) => {
            if !base.negative || base.abs != amount {
                return Err(VaultError::ExactInBaseToQuoteBase);
            }
            if !quote.is_positive() {
                return Err(VaultError::ExactInBaseToQuoteQuote);
            }
        }
        (true, false) => {
            if !base.is_negative() {
                return Err(VaultError::ExactOutBaseToQuoteBase);
            }
            if quote.negative || quote.abs != amount {
                return Err(VaultError::ExactOutBaseToQuoteQuote);
            }
        }
        (false, true) => {
            if !base.is_positive() {
                return Err(VaultError::ExactInQuoteToBaseBase);
            }
            if !quote.negative || quote.abs != amount {
                return Err(VaultError::ExactInQuoteToBaseQuote);
            }
        }
        (false, false) => {
            if base.negative || base.abs != amount {
                return Err(VaultError::ExactOutQuoteToBaseBase);
            }
            if !quote.is_negative() {
                return Err(VaultError::ExactOutQuoteToBaseQuote);
            }
        }
    }
    Ok(())
}

/// Share ledger module for vault tokens
#[odra::module]
pub struct TokenBase {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Share decimals, equal to the exchange's quote decimals
    decimals: Var<u8>,
    /// Total share supply
    total_supply: Var<U256>,
    /// Share balances
    balances: Mapping<Address, U256>,
    /// Raw allowance storage; `U256::MAX` encodes `Allowance::Unlimited`
    allowances: Mapping<(Address, Address), U256>,
    /// The exchange this vault trades against
    exchange: Var<Address>,
    /// Settlement token of the exchange; `None` means native settlement
    settlement_token: Var<Option<Address>>,
    /// Wrapper token reported as the asset under native settlement
    native_wrapper: Var<Option<Address>>,
}

#[odra::module]
impl TokenBase {
    /// Bind the ledger to an exchange and validate the settlement configuration
    pub fn init(&mut self, exchange: Address, native_wrapper: Option<Address>) {
        let market = PerpMarketContractRef::new(self.env(), exchange);

        let settlement_token = market.settlement_token();
        match settlement_token {
            Some(_) => {
                if native_wrapper.is_some() {
                    self.env().revert(VaultError::WrapperNotAllowed);
                }
            }
            None => {
                if native_wrapper.is_none() {
                    self.env().revert(VaultError::WrapperRequired);
                }
            }
        }

        let decimals = market.quote_decimals();
        if decimals != 18 {
            self.env().revert(VaultError::InvalidDecimals);
        }

        let settlement_symbol = match settlement_token {
            Some(token) => Cep18TokenContractRef::new(self.env(), token).symbol(),
            None => String::from("CSPR"),
        };
        let market_symbol = market.market_symbol();

        self.name
            .set(format!("Perp Long {}{}", market_symbol, settlement_symbol));
        self.symbol
            .set(format!("pl{}{}", market_symbol, settlement_symbol));
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.exchange.set(exchange);
        self.settlement_token.set(settlement_token);
        self.native_wrapper.set(native_wrapper);
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// The exchange this vault trades against
    pub fn exchange(&self) -> Address {
        self.exchange.get().unwrap_or_revert(&self.env())
    }

    /// Wrapper token configured for native settlement
    pub fn native_wrapper(&self) -> Option<Address> {
        self.native_wrapper.get_or_default()
    }

    /// Transfer shares to another address
    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.transfer_internal(caller, to, amount);
        true
    }

    /// Approve a spender; `U256::MAX` grants an unlimited allowance
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.approve_internal(caller, spender, amount);
        true
    }

    /// Raise a spender's allowance
    pub fn increase_allowance(&mut self, spender: Address, added: U256) -> bool {
        let caller = self.env().caller();
        match Allowance::from_raw(self.allowance(caller, spender)) {
            Allowance::Unlimited => {
                self.approve_internal(caller, spender, U256::MAX);
            }
            Allowance::Finite(current) => {
                let raised = current
                    .checked_add(added)
                    .unwrap_or_else(|| self.env().revert(TokenError::AllowanceOverflow));
                self.approve_internal(caller, spender, raised);
            }
        }
        true
    }

    /// Lower a spender's allowance
    pub fn decrease_allowance(&mut self, spender: Address, subtracted: U256) -> bool {
        let caller = self.env().caller();
        let current = Allowance::from_raw(self.allowance(caller, spender)).to_raw();
        if current < subtracted {
            self.env().revert(TokenError::InsufficientAllowance);
        }
        self.approve_internal(caller, spender, current - subtracted);
        true
    }

    /// Transfer shares from another address, spending the caller's allowance
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.spend_allowance(from, caller, amount);
        self.transfer_internal(from, to, amount);
        true
    }

    /// Spend `amount` of `spender`'s allowance from `owner`.
    ///
    /// An unlimited allowance is left untouched.
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        match Allowance::from_raw(self.allowance(owner, spender)) {
            Allowance::Unlimited => {}
            Allowance::Finite(current) => {
                if current < amount {
                    self.env().revert(TokenError::InsufficientAllowance);
                }
                self.approve_internal(owner, spender, current - amount);
            }
        }
    }

    /// Reverting wrapper around [`check_open_position_result`]
    pub fn validate_open_position_result(
        &self,
        is_base_to_quote: bool,
        is_exact_input: bool,
        amount: U256,
        base: Signed,
        quote: Signed,
    ) {
        if let Err(error) =
            check_open_position_result(is_base_to_quote, is_exact_input, amount, &base, &quote)
        {
            self.env().revert(error);
        }
    }

    /// Mint shares; supply-increasing, reachable only through the vault
    pub fn mint(&mut self, to: Address, amount: U256) {
        let current_supply = self.total_supply();
        self.total_supply.set(current_supply + amount);

        let current_balance = self.balance_of(to);
        self.balances.set(&to, current_balance + amount);

        self.env().emit_event(Transfer {
            from: Address::from(self.env().self_address()),
            to,
            value: amount,
        });
    }

    /// Burn shares; supply-decreasing, reachable only through the vault
    pub fn burn(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }

        self.balances.set(&from, current_balance - amount);

        let current_supply = self.total_supply();
        self.total_supply.set(current_supply - amount);

        self.env().emit_event(Transfer {
            from,
            to: Address::from(self.env().self_address()),
            value: amount,
        });
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);

        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }
}

// Not part of the contract interface; `SettlementAsset` is a plain Rust enum
impl TokenBase {
    /// Settlement asset selected at construction
    pub fn settlement_asset(&self) -> SettlementAsset {
        match self.settlement_token.get_or_default() {
            Some(token) => SettlementAsset::Token(token),
            None => SettlementAsset::Native,
        }
    }
}
