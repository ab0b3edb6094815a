//! Outlast document store
//!
//! Five named collections of typed documents with equality lookups, counts,
//! unique indexes, and an atomic find-and-modify used as the only
//! compare-and-swap primitive in the system. The store is shared mutable
//! state: every collection shard sits behind its own `RwLock`, and
//! cross-document consistency is the caller's responsibility (operation
//! ordering, no multi-document transactions).

mod collection;
mod error;
pub mod schema;
mod store;

pub use collection::{Collection, Doc, UniqueIndex};
pub use error::{StoreError, StoreResult};
pub use store::{Store, StoreConfig};
