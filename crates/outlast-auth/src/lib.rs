//! Authentication primitives
//!
//! This crate provides:
//! - Password hashing with PBKDF2-SHA256, including the fixed dummy hash
//!   used to equalize login timing for unknown identifiers
//! - HS256 bearer credential encoding/decoding with refresh-due detection
//! - URL-safe random tokens for email verification and password resets
//!
//! # Example
//!
//! ```
//! use outlast_auth::{PasswordHasher, Tokenizer};
//! use time::Duration;
//!
//! let hasher = PasswordHasher::with_iterations(1000);
//! let hash = hasher.hash("hunter22").unwrap();
//! assert!(hasher.verify("hunter22", &hash));
//!
//! let tokenizer = Tokenizer::new(b"secret-key", Duration::days(30), Duration::days(3));
//! let token = tokenizer.issue("657f1a2b3c4d5e6f70819203").unwrap();
//! let claims = tokenizer.decode(&token).unwrap();
//! assert_eq!(claims.sub, "657f1a2b3c4d5e6f70819203");
//! ```

mod error;
mod password;
mod token;

pub use error::{AuthError, AuthResult};
pub use password::PasswordHasher;
pub use token::{random_urlsafe_token, Claims, Tokenizer};
