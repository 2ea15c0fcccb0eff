//! Accounts API Backend
//!
//! User registration and login issuing signed access/refresh tokens.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and routing
//! - Services: registration and login/token flows
//! - Repositories: account store port with PostgreSQL and in-memory adapters
//! - Auth: password hashing, password policy, JWT issuing and validation

use accounts_api::{
    config,
    repositories::{AccountStore, InMemoryAccountStore, PostgresAccountStore},
    routes,
    state::AppState,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Accounts API"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let accounts = connect_account_store(&config).await?;
    let state = AppState::new(accounts, config.clone());
    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the account store selected by `database.url`
async fn connect_account_store(config: &config::AppConfig) -> Result<Arc<dyn AccountStore>> {
    if config.database.is_in_memory() {
        warn!("Using in-memory account store. Accounts are lost on restart.");
        return Ok(Arc::new(InMemoryAccountStore::new()));
    }

    info!("Connecting to database...");
    let store = PostgresAccountStore::connect(&config.database).await?;

    // Production runs migrations as a separate job
    if !config::AppConfig::is_production() {
        store.run_migrations().await?;
    }

    Ok(Arc::new(store))
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "accounts_api=info,tower_http=info".into()
        } else {
            "accounts_api=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    let errors = config.production_errors();
    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
