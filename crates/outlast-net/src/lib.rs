//! outlast-net: HTTP/1.1 server built directly on tokio
//!
//! A small HTTP server without an external framework: request parsing,
//! response serialization, a `:param` router, and a keep-alive connection
//! loop with one task per connection.

pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use error::{NetError, NetResult};
pub use http::{Headers, Method, StatusCode, Version};
pub use request::Request;
pub use response::Response;
pub use router::Router;
pub use server::{Server, ServerConfig};

/// Maximum header block size (8KB)
pub const MAX_HEADER_SIZE: usize = 8 * 1024;

/// Maximum body size (1MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;
