//! Error types for the ledger engine

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Reference error: {0}")]
    Reference(String),

    #[error("Nonce not found after searching 0..={max_nonce}")]
    NonceNotFound { max_nonce: u64 },

    #[error("Invalid difficulty: {0} bits")]
    InvalidDifficulty(u32),

    #[error("Insufficient funds for {address}: available {available}, required {required}")]
    InsufficientFunds {
        address: String,
        available: u64,
        required: u64,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Value overflow: {0}")]
    ValueOverflow(String),

    #[error("No wallet for address {0}")]
    UnknownWallet(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
