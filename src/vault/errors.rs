//! Error definitions for the long token vault
use odra::prelude::*;

/// Custom errors for the long token contracts
#[odra::odra_error]
pub enum VaultError {
    /// A wrapper token was supplied although settlement is a token
    WrapperNotAllowed = 200,

    /// Native settlement requires a wrapper token
    WrapperRequired = 201,

    /// Exchange quote decimals must be 18
    InvalidDecimals = 202,

    /// Native entry point called on a token-settled vault
    NativeNotAvailable = 203,

    /// Token entry point called on a native-settled vault
    TokenNotAvailable = 204,

    /// Deposit amount is zero
    DepositIsZero = 205,

    /// Deposit amount exceeds maxDeposit
    DepositMoreThanMax = 206,

    /// Mint amount is zero
    MintIsZero = 207,

    /// Mint amount exceeds maxMint
    MintMoreThanMax = 208,

    /// Withdraw amount is zero
    WithdrawIsZero = 209,

    /// Withdraw amount exceeds maxWithdraw
    WithdrawMoreThanMax = 210,

    /// Redeem amount is zero
    RedeemIsZero = 211,

    /// Redeem amount exceeds maxRedeem
    RedeemMoreThanMax = 212,

    /// Share conversion with zero total assets
    ZeroTotalAssets = 213,

    /// Share conversion overflowed
    ConversionOverflow = 214,

    /// Attached native value does not cover the required assets
    InsufficientNativeValue = 215,

    /// Reentrant call into a mutating entry point
    Locked = 216,

    /// Settlement token transfer failed
    TransferFailed = 217,

    /// Exact-input sell returned a base delta not matching the input
    ExactInBaseToQuoteBase = 220,

    /// Exact-input sell returned a non-positive quote delta
    ExactInBaseToQuoteQuote = 221,

    /// Exact-input buy returned a non-positive base delta
    ExactInQuoteToBaseBase = 222,

    /// Exact-input buy returned a quote delta not matching the input
    ExactInQuoteToBaseQuote = 223,

    /// Exact-output sell returned a non-negative base delta
    ExactOutBaseToQuoteBase = 224,

    /// Exact-output sell returned a quote delta not matching the output
    ExactOutBaseToQuoteQuote = 225,

    /// Exact-output buy returned a base delta not matching the output
    ExactOutQuoteToBaseBase = 226,

    /// Exact-output buy returned a non-negative quote delta
    ExactOutQuoteToBaseQuote = 227,
}
