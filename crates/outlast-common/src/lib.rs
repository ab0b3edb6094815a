//! Outlast Common - Core types, enums, and error handling
//!
//! Foundational types shared by every Outlast crate:
//!
//! - `id`: opaque 12-byte object identifiers with a 24-hex wire form
//! - `enums`: domain enums (account, membership, pool status, ...)
//! - `error`: the central error type with HTTP status mapping

pub mod enums;
pub mod error;
pub mod id;

pub use enums::*;
pub use error::{Error, ErrorCode, Result};
pub use id::{parse_object_id, ObjectId};

/// Version of the Outlast protocol
pub const OUTLAST_VERSION: &str = env!("CARGO_PKG_VERSION");
