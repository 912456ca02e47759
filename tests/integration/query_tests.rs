//! Integration tests for the query API
//!
//! These tests drive the axum router directly with `tower::ServiceExt::oneshot`
//! over the bundled airport directory and a filesystem store.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lounge_atlas::directory::AirportDirectory;
use lounge_atlas::geo::distance_m;
use lounge_atlas::query::QueryService;
use lounge_atlas::server::build_router;
use lounge_atlas::store::{FsStore, RecordStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const JFK: (f64, f64) = (40.6413, -73.7781);
const LGA: (f64, f64) = (40.7769, -73.874);

/// Router over the bundled directory with records stored for JFK and LGA only
fn create_test_app(temp: &TempDir) -> Router {
    let store = FsStore::new(temp.path().join("iata"));
    store.ensure_ready().unwrap();
    store.write("JFK", br#"{"code":"JFK","lounges":[{"id":"1"}]}"#).unwrap();
    store.write("LGA", br#"{"code":"LGA","lounges":[]}"#).unwrap();

    let directory = Arc::new(AirportDirectory::bundled().unwrap());
    let service = QueryService::new(directory, Arc::new(store), Duration::from_secs(3600));
    build_router(Arc::new(service))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_get_by_code() {
    let temp = TempDir::new().unwrap();
    let (status, body) = get(create_test_app(&temp), "/api/jfk").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "cities": ["New York"],
            "count": 1,
            "airports": [{"code": "JFK", "lounges": [{"id": "1"}]}]
        })
    );
}

#[tokio::test]
async fn test_get_by_code_without_record_is_null() {
    let temp = TempDir::new().unwrap();
    let (status, body) = get(create_test_app(&temp), "/api/EWR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["airports"], json!([null]));
}

#[tokio::test]
async fn test_unknown_and_malformed_codes() {
    let temp = TempDir::new().unwrap();

    let (status, body) = get(create_test_app(&temp), "/api/ZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("ZZZ"));

    let (status, body) = get(create_test_app(&temp), "/api/JFKX").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_search_by_name() {
    let temp = TempDir::new().unwrap();
    let (status, body) = get(create_test_app(&temp), "/api/name/KENNEDY").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cities"], json!(["New York"]));
    assert_eq!(body["count"], 1);
    assert_eq!(body["airports"][0]["code"], "JFK");
}

#[tokio::test]
async fn test_search_by_country_counts_only_stored_records() {
    let temp = TempDir::new().unwrap();
    let (status, body) = get(create_test_app(&temp), "/api/country/us").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["airports"].as_array().unwrap().len(), 2);

    let cities = body["cities"].as_array().unwrap();
    assert!(cities.contains(&json!("New York")));
    assert!(cities.contains(&json!("Newark")));
}

#[tokio::test]
async fn test_search_by_position() {
    let temp = TempDir::new().unwrap();

    let (status, body) = get(
        create_test_app(&temp),
        "/api/position?lat=40.6413&lon=-73.7781&radius=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    // Default radius of 50 km reaches LGA (and EWR, which has no record)
    let (_, body) = get(create_test_app(&temp), "/api/position?lat=40.6413&lon=-73.7781").await;
    assert_eq!(body["count"], 2);
    assert!(body["cities"].as_array().unwrap().contains(&json!("Newark")));
}

#[tokio::test]
async fn test_position_radius_boundary_is_inclusive() {
    let temp = TempDir::new().unwrap();
    let exact_km = distance_m(JFK, LGA) / 1000.0;

    let uri = format!("/api/position?lat={}&lon={}&radius={}", JFK.0, JFK.1, exact_km);
    let (_, body) = get(create_test_app(&temp), &uri).await;
    assert_eq!(body["count"], 2);

    let uri = format!(
        "/api/position?lat={}&lon={}&radius={}",
        JFK.0,
        JFK.1,
        exact_km - 0.001
    );
    let (_, body) = get(create_test_app(&temp), &uri).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_position_rejects_bad_parameters() {
    let temp = TempDir::new().unwrap();

    for uri in [
        "/api/position",
        "/api/position?lon=-73.7",
        "/api/position?lat=abc&lon=-73.7",
        "/api/position?lat=91&lon=-73.7",
        "/api/position?lat=40.6&lon=-181",
        "/api/position?lat=40.6&lon=-73.7&radius=0",
        "/api/position?lat=40.6&lon=-73.7&radius=wide",
    ] {
        let (status, body) = get(create_test_app(&temp), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["message"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let temp = TempDir::new().unwrap();
    let (status, body) = get(create_test_app(&temp), "/nowhere/at/all").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}
