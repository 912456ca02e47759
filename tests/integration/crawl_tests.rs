//! Integration tests for the crawl pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run both crawl
//! stages end-to-end against filesystem stores in temporary directories.

use lounge_atlas::config::{Config, CrawlerConfig, StorageConfig};
use lounge_atlas::crawler::{Crawler, FetchCause};
use lounge_atlas::directory::AirportDirectory;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIRECTORY: &str = r#"[
    {"iata": "AAA", "name": "Alpha Airport", "city": "Alpha", "country": "AA", "latitude": 10.0, "longitude": 10.0},
    {"iata": "BBB", "name": "Bravo Airport", "city": "Bravo", "country": "BB", "latitude": 20.0, "longitude": 20.0},
    {"iata": "CCC", "name": "Charlie Airport", "city": "Charlie", "country": "CC", "latitude": 30.0, "longitude": 30.0}
]"#;

/// Creates a test configuration pointing at the mock server, with no delays
fn create_test_config(base_url: &str, root: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            airport_delay_ms: 0,
            lounge_delay_ms: 0,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        storage: StorageConfig {
            root: root.to_path_buf(),
            ..StorageConfig::default()
        },
        ..Config::default()
    }
}

fn directory() -> AirportDirectory {
    AirportDirectory::from_json_str(DIRECTORY).expect("Failed to build test directory")
}

async fn mount_json(server: &MockServer, route: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/json"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Names of every file in `dir`, sorted
fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_airport_stage_rerun_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    // Each airport must be requested exactly once across both runs
    mount_json(&mock_server, "/api/airport/AAA", r#"{"code":"AAA","lounges":[]}"#, 1).await;
    mount_json(&mock_server, "/api/airport/BBB", r#"{"code":"BBB","lounges":[]}"#, 1).await;
    mount_json(&mock_server, "/api/airport/CCC", r#"{"code":"CCC","lounges":[]}"#, 1).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let crawler = Crawler::new(&config).unwrap();

    let first = crawler.run_airports(&directory()).await.unwrap();
    assert_eq!(first.processed, 3);
    assert_eq!(first.fetched, 3);
    assert!(first.is_clean());

    let airports_dir = config.storage.airports_path();
    let before: Vec<Vec<u8>> = ["AAA", "BBB", "CCC"]
        .iter()
        .map(|code| fs::read(airports_dir.join(format!("{}.json", code))).unwrap())
        .collect();

    let second = crawler.run_airports(&directory()).await.unwrap();
    assert_eq!(second.processed, 3);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.skipped, 3);

    let after: Vec<Vec<u8>> = ["AAA", "BBB", "CCC"]
        .iter()
        .map(|code| fs::read(airports_dir.join(format!("{}.json", code))).unwrap())
        .collect();
    assert_eq!(before, after);
    assert_eq!(
        fs::read_to_string(airports_dir.join("AAA.json")).unwrap(),
        r#"{"code":"AAA","lounges":[]}"#
    );
}

#[tokio::test]
async fn test_full_pipeline_discovers_and_fetches_lounges() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_json(
        &mock_server,
        "/api/airport/AAA",
        r#"{"lounges":[{"id":"a","slugPath":"/aaa/a"},{"id":"b"}]}"#,
        1,
    )
    .await;
    mount_json(&mock_server, "/api/airport/BBB", r#"{"lounges":[{"id":"b"}]}"#, 1).await;
    mount_json(&mock_server, "/api/airport/CCC", r#"{"name":"no lounges here"}"#, 1).await;

    // "b" is listed twice but the second occurrence finds it already stored
    mount_json(&mock_server, "/api/lounge/a", r#"{"id":"a"}"#, 1).await;
    mount_json(&mock_server, "/api/lounge/b", r#"{"id":"b"}"#, 1).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let crawler = Crawler::new(&config).unwrap();

    let (airports, lounges) = crawler.run_all(&directory()).await.unwrap();

    assert_eq!(airports.fetched, 3);
    assert_eq!(lounges.processed, 3);
    assert_eq!(lounges.fetched, 2);
    assert_eq!(lounges.skipped, 1);
    assert!(lounges.is_clean());

    assert_eq!(
        file_names(&config.storage.lounges_path()),
        vec!["a.json", "b.json"]
    );
    assert_eq!(
        fs::read_to_string(config.storage.lounges_path().join("a.json")).unwrap(),
        r#"{"id":"a"}"#
    );
}

#[tokio::test]
async fn test_lounge_stage_runs_from_persisted_airports() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_json(&mock_server, "/api/lounge/x", r#"{"id":"x"}"#, 1).await;

    // Airport records left behind by an earlier process
    let config = create_test_config(&mock_server.uri(), temp.path());
    let airports_dir = config.storage.airports_path();
    fs::create_dir_all(&airports_dir).unwrap();
    fs::write(airports_dir.join("AAA.json"), r#"{"lounges":[{"id":"x"}]}"#).unwrap();
    fs::write(airports_dir.join("BBB.json"), "<html>not json</html>").unwrap();
    fs::write(airports_dir.join(".CCC.json.part"), r#"{"lounges":[{"id":"y"}]}"#).unwrap();

    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run_lounges().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.fetched, 1);
    assert!(config.storage.lounges_path().join("x.json").exists());
}

#[tokio::test]
async fn test_failed_item_is_isolated_and_leaves_no_file() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_json(&mock_server, "/api/airport/AAA", r#"{"lounges":[]}"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/airport/BBB"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_json(&mock_server, "/api/airport/CCC", r#"{"lounges":[]}"#, 1).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let crawler = Crawler::new(&config).unwrap();

    let report = crawler.run_airports(&directory()).await.unwrap();
    assert_eq!(report.processed, 3);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].item.url.ends_with("/api/airport/BBB"));
    assert!(matches!(report.failed[0].error.cause, FetchCause::Status(500)));

    // Neither a record nor a partial file for the failed airport
    assert_eq!(
        file_names(&config.storage.airports_path()),
        vec!["AAA.json", "CCC.json"]
    );

    // A re-run retries only the missing airport
    let rerun = crawler.run_airports(&directory()).await.unwrap();
    assert_eq!(rerun.skipped, 2);
    assert_eq!(rerun.failed.len(), 1);
}

#[tokio::test]
async fn test_lounge_stage_without_airports_does_nothing() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let crawler = Crawler::new(&config).unwrap();

    let report = crawler.run_lounges().await.unwrap();
    assert_eq!(report.processed, 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_refetch_overwrites_existing_records() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_json(&mock_server, "/api/airport/AAA", r#"{"fresh":true}"#, 1).await;
    mount_json(&mock_server, "/api/airport/BBB", r#"{"fresh":true}"#, 1).await;
    mount_json(&mock_server, "/api/airport/CCC", r#"{"fresh":true}"#, 1).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let airports_dir = config.storage.airports_path();
    fs::create_dir_all(&airports_dir).unwrap();
    fs::write(airports_dir.join("AAA.json"), r#"{"fresh":false}"#).unwrap();

    let crawler = Crawler::new(&config).unwrap().with_skip_existing(false);
    let report = crawler.run_airports(&directory()).await.unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        fs::read_to_string(airports_dir.join("AAA.json")).unwrap(),
        r#"{"fresh":true}"#
    );
}

#[tokio::test]
async fn test_dedupe_lounges_requests_each_id_once() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_json(&mock_server, "/api/lounge/b", r#"{"id":"b"}"#, 1).await;

    let mut config = create_test_config(&mock_server.uri(), temp.path());
    config.crawler.dedupe_lounges = true;
    config.crawler.skip_existing = false;

    let airports_dir = config.storage.airports_path();
    fs::create_dir_all(&airports_dir).unwrap();
    fs::write(airports_dir.join("AAA.json"), r#"{"lounges":[{"id":"b"}]}"#).unwrap();
    fs::write(airports_dir.join("BBB.json"), r#"{"lounges":[{"id":"b"}]}"#).unwrap();

    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run_lounges().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.fetched, 1);
}
