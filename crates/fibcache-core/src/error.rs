//! Error types for fibcache

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failures of a single key-value store round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::AlreadyExists(_) => "already_exists",
            StoreError::Unreachable(_) => "unreachable",
            StoreError::Cancelled => "cancelled",
            StoreError::Other(_) => "store_error",
        }
    }
}

/// Errors surfaced by the request flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::Unauthenticated => "unauthorized",
            ServiceError::Store(e) => e.code(),
        }
    }
}
