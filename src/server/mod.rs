//! Server module for the HTTP query API
//!
//! Routes:
//! - `GET /api/:iata` - one airport by code
//! - `GET /api/name/:name` - airports whose name contains `name`
//! - `GET /api/country/:country` - airports in a country
//! - `GET /api/position?lat&lon&radius` - airports within a radius

mod routes;

pub use routes::{ApiError, AppState, ErrorBody, PositionParams};

use crate::config::ServerConfig;
use crate::query::QueryService;
use crate::AtlasError;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the API router over a query service
pub fn build_router(service: Arc<QueryService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/position", get(routes::airports_by_position))
        .route("/api/name/:name", get(routes::airports_by_name))
        .route("/api/country/:country", get(routes::airports_by_country))
        .route("/api/:iata", get(routes::airport_by_code))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on the configured address until Ctrl-C
pub async fn serve(config: &ServerConfig, service: Arc<QueryService>) -> Result<(), AtlasError> {
    let app = build_router(service);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;

    tracing::info!("Query API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Query API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
