//! outlast-core: identity and account lifecycle
//!
//! - `auth`: the gate that turns a bearer credential into a `Principal`,
//!   minting a replacement credential when the old one is due for refresh
//! - `user`: signup, login with lockout, password lifecycle, email
//!   verification, default-pool management, user search, delete cascade
//! - `email`: the seam to the external transactional email service

pub mod auth;
pub mod email;
pub mod user;

pub use auth::{AuthGate, Principal};
pub use email::{LogMailer, Mailer};
pub use user::{UserSearchResult, UserService, UserView};
