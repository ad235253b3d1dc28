//! Errors the engine can return.
//!
//! Validation failures carry an actionable message that is safe to show to
//! the user as-is. [`PartialTransfer`] is reserved for a broken transfer
//! pair: one half of a linked transfer exists without its peer, which needs
//! manual reconciliation rather than a silent retry.
//!
//! [`PartialTransfer`]: EngineError::PartialTransfer
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid share: {0}")]
    InvalidShare(String),
    #[error("Invalid pocket: {0}")]
    InvalidPocket(String),
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Partial transfer: {0}")]
    PartialTransfer(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRecord(a), Self::InvalidRecord(b)) => a == b,
            (Self::InvalidShare(a), Self::InvalidShare(b)) => a == b,
            (Self::InvalidPocket(a), Self::InvalidPocket(b)) => a == b,
            (Self::InvalidInstrument(a), Self::InvalidInstrument(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::PartialTransfer(a), Self::PartialTransfer(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
