//! Shared application state threaded through handlers

use std::sync::Arc;

use outlast_core::{AuthGate, UserService};
use outlast_pool::PoolService;
use outlast_store::Store;

use crate::cors::CorsConfig;

/// Everything a handler needs. Built once at startup, shared via `Arc`.
pub struct AppState {
    /// The document store
    pub store: Arc<Store>,
    /// User account service
    pub users: UserService,
    /// Pool lifecycle service
    pub pools: PoolService,
    /// Bearer credential gate
    pub gate: AuthGate,
    /// CORS policy
    pub cors: CorsConfig,
}

impl AppState {
    /// Assemble the state from its parts
    pub fn new(
        store: Arc<Store>,
        users: UserService,
        pools: PoolService,
        gate: AuthGate,
        cors: CorsConfig,
    ) -> Self {
        Self {
            store,
            users,
            pools,
            gate,
            cors,
        }
    }
}
