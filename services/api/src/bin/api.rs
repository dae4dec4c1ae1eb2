//! services/api/src/bin/api.rs
//!
//! Goal tracker HTTP server: `/api/goals`, `/health` and the Swagger UI.

use api_lib::{
    adapters::DbAdapter,
    config::Config,
    error::ApiError,
    web::{router, ApiDoc, AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Arc::new(Config::from_env()?);
    init_tracing(&config);
    info!(environment = ?config.environment, "Goal tracker starting");

    let pool = connect_store(&config).await?;
    let goals = Arc::new(DbAdapter::new(pool.clone()));
    goals.run_migrations().await?;
    info!("Goal store ready");

    let cors = cors_layer(&config)?;
    let app = Router::new()
        .merge(router(Arc::new(AppState::new(goals, config.clone()))).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Listening on http://{} (docs at /swagger-ui)", config.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing goal store connections");
    pool.close().await;
    Ok(())
}

fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn connect_store(config: &Config) -> Result<PgPool, ApiError> {
    info!(
        max_connections = config.database_max_connections,
        "Connecting to the goal store"
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Lets the portfolio frontend call the API with credentials.
fn cors_layer(config: &Config) -> Result<CorsLayer, ApiError> {
    let origin = config
        .cors_allowed_origin
        .parse::<HeaderValue>()
        .map_err(|source| ApiError::CorsOrigin {
            origin: config.cors_allowed_origin.clone(),
            source,
        })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
