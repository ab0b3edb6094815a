//! Outlast - survivor pool server binary
//!
//! # Usage
//!
//! ```bash
//! # Run the server
//! outlast serve
//!
//! # Validate configuration without serving
//! outlast check
//!
//! # Show version
//! outlast version
//! ```

mod app;
mod config;

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "serve" | "server" | "run" => run_server(),
        "check" => run_check(),
        "version" | "-v" | "--version" => show_version(),
        "help" | "-h" | "--help" => show_help(),
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run 'outlast help' for usage information.");
            ExitCode::from(1)
        }
    }
}

/// Run the HTTP server
fn run_server() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Outlast server");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(1);
        }
    };

    let app = match app::App::new(&config) {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Failed to initialize application");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to create tokio runtime");
            return ExitCode::from(1);
        }
    };

    let outcome = rt.block_on(async {
        tokio::select! {
            result = app.serve() => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                Ok(())
            }
        }
    });

    match outcome {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::from(1)
        }
    }
}

/// Validate configuration and wiring without serving
fn run_check() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Configuration check failed");
            return ExitCode::from(1);
        }
    };
    info!("Configuration: OK");

    if config.auth.jwt_secret_key.len() < 32 {
        error!("JWT secret too short (must be at least 32 bytes)");
        return ExitCode::from(1);
    }
    info!("JWT secret: OK");

    if let Err(e) = app::App::new(&config) {
        error!(error = %e, "Application wiring failed");
        return ExitCode::from(1);
    }
    info!("All checks passed");
    ExitCode::SUCCESS
}

/// Show version information
fn show_version() -> ExitCode {
    println!("outlast {}", env!("CARGO_PKG_VERSION"));
    ExitCode::SUCCESS
}

/// Show help information
fn show_help() -> ExitCode {
    println!("outlast - survivor pool server");
    println!();
    println!("USAGE:");
    println!("    outlast <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    serve       Start the HTTP server");
    println!("    check       Validate configuration and wiring");
    println!("    version     Show version information");
    println!("    help        Show this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    OUTLAST_HOST                 Bind host (default: 0.0.0.0)");
    println!("    OUTLAST_PORT                 Bind port (default: 8080)");
    println!("    CORS_ALLOW_ORIGIN_REGEX      Allowed browser origins (required)");
    println!("    MONGO_URL                    Document store endpoint (required)");
    println!("    DATABASE_NAME                Database name (required)");
    println!("    JWT_SECRET_KEY               Credential signing secret (required)");
    println!("    JWT_TOKEN_TTL_DAYS           Credential lifetime (default: 30)");
    println!("    JWT_REFRESH_INTERVAL_DAYS    Refresh threshold (default: 3)");
    println!("    RESEND_API_KEY               Transactional email key (required)");
    println!("    OUTLAST_LOG_LEVEL            Log level (default: info)");
    println!("    OUTLAST_LOG_FORMAT           Log format json|pretty (default: json)");
    ExitCode::SUCCESS
}

/// Initialize logging
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = env::var("OUTLAST_LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_format = env::var("OUTLAST_LOG_FORMAT").unwrap_or_else(|_| "json".into());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| e.to_string())?;
    } else {
        subscriber
            .with(fmt::layer().pretty())
            .try_init()
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_and_version_do_not_panic() {
        let _ = show_version();
        let _ = show_help();
    }
}
