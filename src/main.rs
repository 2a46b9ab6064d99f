//! ThingDash Server: IoT Dashboard Backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use thingdash_core::config::AppConfig;
use thingdash_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("THINGDASH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ThingDash v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    let db_pool = thingdash_database::DatabasePool::connect(&config.database).await?;
    thingdash_database::migration::run_migrations(db_pool.pool()).await?;

    // Presence store backed by the users table
    let user_repo = Arc::new(
        thingdash_database::repositories::user::UserRepository::new(db_pool.pool().clone()),
    );
    let store: Arc<dyn thingdash_database::PresenceStore> = user_repo;

    // Auth
    let jwt_decoder = Arc::new(thingdash_auth::jwt::decoder::JwtDecoder::new(&config.auth));

    // Realtime gateway
    let gateway = thingdash_realtime::RealtimeGateway::new(
        config.realtime.clone(),
        Arc::clone(&store),
        Arc::clone(&jwt_decoder),
    );
    gateway.start()?;
    tracing::info!("Realtime gateway started");

    // Build and start HTTP server
    let app_state = thingdash_api::AppState {
        config: Arc::new(config.clone()),
        store,
        jwt_decoder,
        gateway,
    };

    let app = thingdash_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("ThingDash server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    db_pool.close().await;
    tracing::info!("ThingDash server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
