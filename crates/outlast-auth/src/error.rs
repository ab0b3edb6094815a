//! Error types for outlast-auth

use std::fmt;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during authentication primitives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credential has expired
    TokenExpired,
    /// Credential is malformed or otherwise unusable
    InvalidToken(String),
    /// Credential signature verification failed
    SignatureInvalid,
    /// Password fails the format rules
    InvalidPasswordFormat(String),
    /// Stored hash string is malformed
    InvalidHashFormat,
    /// Internal error (RNG failure and the like)
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::TokenExpired => write!(f, "Credential has expired"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid credential: {}", msg),
            AuthError::SignatureInvalid => write!(f, "Credential signature verification failed"),
            AuthError::InvalidPasswordFormat(msg) => write!(f, "Invalid password: {}", msg),
            AuthError::InvalidHashFormat => write!(f, "Invalid password hash format"),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
