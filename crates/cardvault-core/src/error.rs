//! Error types for card custody operations
//!
//! Every error is terminal for the invoking operation and leaves all state
//! as it was before the call.

use cardvault_ledger::LedgerError;
use cardvault_types::{Address, Amount};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the registry and its cards
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Caller {caller} is not the card owner (owner is {owner})")]
    NotOwner { caller: Address, owner: Address },

    #[error("Registry no longer owns card {card} (owner is {owner})")]
    NotCurrentOwner { card: String, owner: Address },

    #[error("Caller {caller} is not on the vendor whitelist")]
    NotWhitelisted { caller: Address },

    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Card {card} has not been created")]
    UnknownCard { card: String },

    #[error("Caller {caller} is not the registry admin")]
    Unauthorized { caller: Address },

    #[error("Invalid owner: {owner}")]
    InvalidOwner { owner: Address },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<LedgerError> for CardError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => CardError::InsufficientBalance {
                available,
                required,
            },
            LedgerError::InvalidAmount { message } => CardError::InvalidAmount { message },
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
