//! HTTP handlers for the query API

use crate::query::{AirportResponse, QueryError, QueryService};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State shared with every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
}

/// Error body returned by every failing route
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Request failures, one per response status
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::AirportNotFound(_) => ApiError::NotFound(error.to_string()),
            QueryError::InvalidCode(_) => ApiError::BadRequest(error.to_string()),
            QueryError::Internal(_) => ApiError::Internal(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

type ApiResult = Result<Json<AirportResponse>, ApiError>;

/// Raw position-search parameters, validated by hand so every rejection
/// carries a JSON message
#[derive(Debug, Deserialize)]
pub struct PositionParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
}

/// `GET /api/:iata`
pub async fn airport_by_code(State(state): State<AppState>, Path(iata): Path<String>) -> ApiResult {
    let response = blocking(state, move |service| service.get_by_code(&iata)).await?;
    Ok(Json(response))
}

/// `GET /api/name/:name`
pub async fn airports_by_name(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult {
    let response = blocking(state, move |service| Ok(service.search_by_name(&name))).await?;
    Ok(Json(response))
}

/// `GET /api/country/:country`
pub async fn airports_by_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult {
    let response = blocking(state, move |service| Ok(service.search_by_country(&country))).await?;
    Ok(Json(response))
}

/// `GET /api/position?lat=..&lon=..&radius=..`
pub async fn airports_by_position(
    State(state): State<AppState>,
    Query(params): Query<PositionParams>,
) -> ApiResult {
    let lat = coordinate("lat", params.lat.as_deref(), 90.0)?;
    let lon = coordinate("lon", params.lon.as_deref(), 180.0)?;
    let radius = radius(params.radius.as_deref())?;

    let response = blocking(state, move |service| {
        Ok(service.search_by_position(lat, lon, radius))
    })
    .await?;
    Ok(Json(response))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Runs a query on the blocking pool; record reads touch the filesystem
async fn blocking<F>(state: AppState, query: F) -> Result<AirportResponse, ApiError>
where
    F: FnOnce(&QueryService) -> Result<AirportResponse, QueryError> + Send + 'static,
{
    let service = state.service;
    let result = tokio::task::spawn_blocking(move || query(&service))
        .await
        .map_err(|e| QueryError::Internal(format!("Query task failed: {}", e)))?;
    Ok(result?)
}

/// Parses a required coordinate, finite and within `±limit` degrees
fn coordinate(name: &str, raw: Option<&str>, limit: f64) -> Result<f64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required parameter: {}", name)))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {:?} is not a number", name, raw)))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(ApiError::BadRequest(format!(
            "Invalid {}: must be between -{} and {}",
            name, limit, limit
        )));
    }

    Ok(value)
}

/// Parses the optional radius in kilometres; absent means the default
fn radius(raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid radius: {:?} is not a positive number",
            raw
        ))),
    }
}
