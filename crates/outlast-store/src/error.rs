//! Error types for the store

use std::fmt;

use outlast_common::{Error, ErrorCode};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Debug, Clone)]
pub enum StoreError {
    /// Document not found
    NotFound,
    /// A unique index rejected the write; carries the index name
    DuplicateKey(&'static str),
    /// Store is unreachable
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Document not found"),
            StoreError::DuplicateKey(index) => {
                write!(f, "Duplicate key for unique index {}", index)
            }
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Error::new(ErrorCode::NotFound, "Document not found"),
            StoreError::DuplicateKey(index) => {
                Error::conflict(format!("Duplicate key for unique index {}", index))
            }
            StoreError::Unavailable(msg) => Error::new(ErrorCode::StoreError, msg),
        }
    }
}
