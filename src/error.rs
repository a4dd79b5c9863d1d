//! Error types for payment settlement
//!
//! Every failure in this crate is a value of [`SettlementError`]; no
//! operation aborts the process.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Insufficient funds: {shortfall} satoshis short of {required}")]
    InsufficientFunds { required: u64, shortfall: u64 },

    #[error("Signing failed: {0}")]
    SigningError(String),

    #[error("Incomplete transaction: {0}")]
    IncompleteTransaction(String),

    #[error("Broadcast failed: {0}")]
    BroadcastError(String),

    #[error("Stale observation: tip {observed} behind recorded tip {recorded}")]
    StaleObservation { observed: u64, recorded: u64 },

    #[error("Unknown invoice: {0}")]
    UnknownInvoice(u64),

    #[error("Duplicate invoice: {0}")]
    DuplicateInvoice(u64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, SettlementError>;
