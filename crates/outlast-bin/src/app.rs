//! Application wiring
//!
//! One `App` value is built at startup; it owns the store, the services,
//! and the server. There are no process-wide mutables.

use std::sync::Arc;

use time::Duration;

use outlast_api::{build_router, AppState, CorsConfig};
use outlast_auth::{PasswordHasher, Tokenizer};
use outlast_core::{AuthGate, LogMailer, UserService};
use outlast_net::{NetResult, Server, ServerConfig};
use outlast_pool::PoolService;
use outlast_store::{Store, StoreConfig};

use crate::config::{Config, ConfigError};

/// The assembled application
pub struct App {
    server: Server,
}

impl App {
    /// Wire every component from configuration
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let store = Arc::new(Store::open(StoreConfig::new(
            &config.store.url,
            &config.store.database,
        )));

        let hasher = Arc::new(PasswordHasher::new());
        let tokenizer = Arc::new(Tokenizer::new(
            config.auth.jwt_secret_key.as_bytes(),
            Duration::days(config.auth.token_ttl_days),
            Duration::days(config.auth.refresh_interval_days),
        ));

        let pools = PoolService::new(store.clone());
        let users = UserService::new(
            store.clone(),
            hasher,
            tokenizer.clone(),
            Arc::new(LogMailer),
            pools.clone(),
        );
        let gate = AuthGate::new(store.clone(), tokenizer);

        let cors = CorsConfig::new(&config.cors.allow_origin_regex)
            .map_err(|_| ConfigError::InvalidValue("CORS_ALLOW_ORIGIN_REGEX"))?;

        let state = Arc::new(AppState::new(store, users, pools, gate, cors));
        let router = build_router(state);

        tracing::info!(
            routes = router.route_count(),
            addr = %config.server.bind_addr,
            "Application wired"
        );

        let server = Server::new(ServerConfig::new(config.server.bind_addr), router);
        Ok(Self { server })
    }

    /// Run the HTTP server until the process stops
    pub async fn serve(&self) -> NetResult<()> {
        self.server.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, CorsConfig as CorsSettings, EmailConfig, LogConfig, ServerConfig as Bind,
        StoreConfig as StoreSettings,
    };

    fn test_config() -> Config {
        Config {
            server: Bind {
                bind_addr: ([127, 0, 0, 1], 0).into(),
            },
            store: StoreSettings {
                url: "mongodb://localhost:27017".into(),
                database: "survivor_pool_test".into(),
            },
            auth: AuthConfig {
                jwt_secret_key: "a-secret-at-least-this-long".into(),
                token_ttl_days: 30,
                refresh_interval_days: 3,
            },
            cors: CorsSettings {
                allow_origin_regex: r"http://localhost(:\d+)?".into(),
            },
            email: EmailConfig {
                resend_api_key: "re_test".into(),
            },
            logging: LogConfig {
                level: "info".into(),
                format: "pretty".into(),
            },
        }
    }

    #[test]
    fn test_app_wires_up() {
        let app = App::new(&test_config());
        assert!(app.is_ok());
    }

    #[test]
    fn test_bad_cors_regex_is_rejected() {
        let mut config = test_config();
        config.cors.allow_origin_regex = "(".into();
        assert!(matches!(
            App::new(&config),
            Err(ConfigError::InvalidValue("CORS_ALLOW_ORIGIN_REGEX"))
        ));
    }
}
