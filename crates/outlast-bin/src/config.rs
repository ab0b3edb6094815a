//! Application configuration
//!
//! Loaded from environment variables. Secrets and connection targets are
//! required; everything else has a default.

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required variable is absent
    Missing(&'static str),
    /// A variable is present but unusable
    InvalidValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "Missing required variable {}", name),
            ConfigError::InvalidValue(name) => write!(f, "Invalid value for {}", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub email: EmailConfig,
    pub logging: LogConfig,
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            store: StoreConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            email: EmailConfig::from_env()?,
            logging: LogConfig::from_env(),
        })
    }
}

/// Server bind configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = env::var("OUTLAST_HOST")
            .unwrap_or_else(|_| "0.0.0.0".into())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("OUTLAST_HOST"))?;

        let port: u16 = env::var("OUTLAST_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("OUTLAST_PORT"))?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
        })
    }
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: require("MONGO_URL")?,
            database: require("DATABASE_NAME")?,
        })
    }
}

/// Credential configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret_key: String,
    pub token_ttl_days: i64,
    pub refresh_interval_days: i64,
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret_key: require("JWT_SECRET_KEY")?,
            token_ttl_days: env::var("JWT_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_TOKEN_TTL_DAYS"))?,
            refresh_interval_days: env::var("JWT_REFRESH_INTERVAL_DAYS")
                .unwrap_or_else(|_| "3".into())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_REFRESH_INTERVAL_DAYS"))?,
        })
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origin_regex: String,
}

impl CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            allow_origin_regex: require("CORS_ALLOW_ORIGIN_REGEX")?,
        })
    }
}

/// Transactional email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub resend_api_key: String,
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            resend_api_key: require("RESEND_API_KEY")?,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl LogConfig {
    fn from_env() -> Self {
        Self {
            level: env::var("OUTLAST_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: env::var("OUTLAST_LOG_FORMAT").unwrap_or_else(|_| "json".into()),
        }
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
