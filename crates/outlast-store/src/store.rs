//! The five named collections

use crate::collection::Collection;
use crate::schema::{MembershipDoc, PickDoc, PoolDoc, SeasonDoc, UserDoc};
use crate::StoreResult;

/// Store connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Document store endpoint
    pub url: String,
    /// Database name
    pub database: String,
}

impl StoreConfig {
    /// Create a new store configuration
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("mongodb://localhost:27017", "survivor_pool")
    }
}

/// The document store: five collections plus their unique indexes.
///
/// Constructed once at startup and shared across request handlers.
pub struct Store {
    config: StoreConfig,
    /// User accounts
    pub users: Collection<UserDoc>,
    /// Survivor pools
    pub pools: Collection<PoolDoc>,
    /// Pool memberships, one per (pool, user)
    pub memberships: Collection<MembershipDoc>,
    /// Season metadata (read-only)
    pub seasons: Collection<SeasonDoc>,
    /// Weekly picks
    pub picks: Collection<PickDoc>,
}

impl Store {
    /// Open the store and register the unique indexes
    pub fn open(config: StoreConfig) -> Self {
        tracing::info!(
            url = %config.url,
            database = %config.database,
            "Opening document store"
        );

        Self {
            config,
            users: Collection::new("users")
                .with_unique("username", |u: &UserDoc| Some(u.username.clone()))
                .with_unique("email", |u: &UserDoc| Some(u.email.clone())),
            pools: Collection::new("pools"),
            memberships: Collection::new("pool_memberships").with_unique(
                "pool_user",
                |m: &MembershipDoc| Some(format!("{}/{}", m.pool_id, m.user_id)),
            ),
            seasons: Collection::new("seasons"),
            picks: Collection::new("picks").with_unique("pool_user_week", |p: &PickDoc| {
                Some(format!("{}/{}/{}", p.pool_id, p.user_id, p.week))
            }),
        }
    }

    /// Open with default local configuration (tests, development)
    pub fn in_memory() -> Self {
        Self::open(StoreConfig::default())
    }

    /// Probe store health
    pub fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Configured database name
    pub fn database(&self) -> &str {
        &self.config.database
    }
}
