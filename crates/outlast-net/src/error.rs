//! Error types for the networking layer

use std::fmt;
use std::io;

/// Network operation result type
pub type NetResult<T> = Result<T, NetError>;

/// Network error types
#[derive(Debug)]
pub enum NetError {
    /// I/O error
    Io(io::Error),
    /// Invalid HTTP request
    InvalidRequest(String),
    /// Request body too large
    RequestTooLarge,
    /// Header block too large
    HeaderTooLarge,
    /// Connection closed by the peer
    ConnectionClosed,
    /// Route not found
    NotFound,
    /// Path matched with a different method
    MethodNotAllowed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Io(e) => write!(f, "I/O error: {}", e),
            NetError::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            NetError::RequestTooLarge => write!(f, "Request too large"),
            NetError::HeaderTooLarge => write!(f, "Header too large"),
            NetError::ConnectionClosed => write!(f, "Connection closed"),
            NetError::NotFound => write!(f, "Route not found"),
            NetError::MethodNotAllowed => write!(f, "Method not allowed"),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(err: io::Error) -> Self {
        NetError::Io(err)
    }
}
