// Main entry point for the signup API server

use std::sync::Arc;

use anyhow::{Context, Result};
use signup_core::kernel::{
    BaseScopedStore, LoggingOtpTransport, MemoryScopedStore, PostgresScopedStore,
    RegistrationClient, ServerDeps, SystemClock,
};
use signup_core::server::{build_app, AppState};
use signup_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,signup_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting expert signup API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let store: Arc<dyn BaseScopedStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations complete");

            Arc::new(PostgresScopedStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, OTP records and drafts are kept in memory");
            Arc::new(MemoryScopedStore::new())
        }
    };

    let deps = ServerDeps::new(
        store,
        Arc::new(SystemClock),
        Arc::new(LoggingOtpTransport),
        Arc::new(RegistrationClient::new(config.registration_api_url.clone())),
        config.otp,
    );

    let app = build_app(AppState::new(Arc::new(deps), config.flow_idle_ttl), &config)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
