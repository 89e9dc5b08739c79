//! Error definitions for the share and settlement token ledgers
use odra::prelude::*;

/// Custom errors for CEP-18 style token ledgers
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 100,

    /// Insufficient balance for operation
    InsufficientBalance = 101,

    /// Allowance increment overflowed
    AllowanceOverflow = 102,
}
