//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`EmptyName`], [`InvalidAmount`] and [`SameWallet`] thrown when the
//!   arguments of an operation are rejected before touching the store.
//! - [`KeyNotFound`] thrown when a wallet id does not resolve.
//! - [`InsufficientFunds`] thrown when a debit would drive a balance negative.
//! - [`Storage`] thrown when the store fails a write it was expected to accept.
//!
//!  [`EmptyName`]: EngineError::EmptyName
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`SameWallet`]: EngineError::SameWallet
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`Storage`]: EngineError::Storage
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("wallet name must not be empty")]
    EmptyName,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("source and destination wallet must differ")]
    SameWallet,
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Returns `true` for errors raised from the arguments alone, before the
    /// store is locked.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName | Self::InvalidAmount(_) | Self::SameWallet
        )
    }
}
