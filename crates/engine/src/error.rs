//! The module contains the errors the engine can throw.
//!
//! Validation errors carry a human-readable message that is safe to surface
//! to the initiating user or admin. [`Database`] wraps the underlying store
//! error and is scrubbed at the server boundary.
//!
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Invalid routing code: {0}")]
    InvalidRoutingCode(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Expired: {0}")]
    Expired(String),
    #[error("Too many attempts: {0}")]
    TooManyAttempts(String),
    #[error("Invalid code: {0}")]
    InvalidCode(String),
    #[error("Already used: {0}")]
    AlreadyUsed(String),
    #[error("Already resolved: {0}")]
    AlreadyResolved(String),
    #[error("Delivery failure: {0}")]
    DeliveryFailure(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidRoutingCode(a), Self::InvalidRoutingCode(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Expired(a), Self::Expired(b)) => a == b,
            (Self::TooManyAttempts(a), Self::TooManyAttempts(b)) => a == b,
            (Self::InvalidCode(a), Self::InvalidCode(b)) => a == b,
            (Self::AlreadyUsed(a), Self::AlreadyUsed(b)) => a == b,
            (Self::AlreadyResolved(a), Self::AlreadyResolved(b)) => a == b,
            (Self::DeliveryFailure(a), Self::DeliveryFailure(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
