//! Error types for Outlast
//!
//! Centralized error handling with error codes for API responses.

use std::fmt;

/// Result type alias using the Outlast error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, Clone)]
pub struct Error {
    /// Error code (for API responses)
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }

    // Convenience constructors

    /// Creates a NotFound error for the specified resource.
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Creates a bad request error with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Creates an unauthorized error with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Creates a forbidden error with the given message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Creates a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Creates a rate limited error with the given message.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Creates an internal server error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // 400 Bad Request
    /// Generic bad request error
    BadRequest,
    /// Identifier failed to parse as 24 hex chars
    InvalidId,

    // 401 Unauthorized
    /// Authentication required or credential rejected
    Unauthorized,
    /// Credential has expired
    TokenExpired,

    // 403 Forbidden
    /// Action is not allowed for this caller
    Forbidden,

    // 404 Not Found
    /// Generic resource not found
    NotFound,
    /// User not found
    UserNotFound,
    /// Pool not found
    PoolNotFound,
    /// Season not found
    SeasonNotFound,
    /// Contestant not found
    ContestantNotFound,
    /// Invite not found
    InviteNotFound,

    // 409 Conflict
    /// Concurrent modification or already-handled invite
    Conflict,

    // 429 Too Many Requests
    /// Login lockout in effect
    RateLimited,

    // 500 Internal Server Error
    /// Generic internal server error
    Internal,
    /// Cached score/available-set invariant violated
    CacheInvalid,
    /// Store operation failed
    StoreError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidId => "INVALID_ID",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PoolNotFound => "POOL_NOT_FOUND",
            Self::SeasonNotFound => "SEASON_NOT_FOUND",
            Self::ContestantNotFound => "CONTESTANT_NOT_FOUND",
            Self::InviteNotFound => "INVITE_NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Internal => "INTERNAL_ERROR",
            Self::CacheInvalid => "CACHE_INVALID",
            Self::StoreError => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest | Self::InvalidId => 400,

            Self::Unauthorized | Self::TokenExpired => 401,

            Self::Forbidden => 403,

            Self::NotFound
            | Self::UserNotFound
            | Self::PoolNotFound
            | Self::SeasonNotFound
            | Self::ContestantNotFound
            | Self::InviteNotFound => 404,

            Self::Conflict => 409,

            Self::RateLimited => 429,

            Self::Internal | Self::CacheInvalid | Self::StoreError => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::not_found("Pool").with_context("pool_id: abc");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.http_status(), 404);
        assert!(err.to_string().contains("Pool not found"));
        assert!(err.to_string().contains("pool_id: abc"));
    }

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::InvalidId.http_status(), 400);
        assert_eq!(ErrorCode::Unauthorized.http_status(), 401);
        assert_eq!(ErrorCode::Forbidden.http_status(), 403);
        assert_eq!(ErrorCode::PoolNotFound.http_status(), 404);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::RateLimited.http_status(), 429);
        assert_eq!(ErrorCode::CacheInvalid.http_status(), 500);
    }

    #[test]
    fn test_server_error_check() {
        assert!(Error::internal("boom").is_server_error());
        assert!(!Error::bad_request("nope").is_server_error());
    }
}
