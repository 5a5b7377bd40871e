use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt; // for `oneshot`

use linkcount::aggregator::Aggregator;
use linkcount::api::models::HealthResponse;
use linkcount::api::router;
use linkcount::api::state::AppState;
use linkcount::config::Config;
use linkcount::fetcher::{FetchError, Fetcher};

/// Fetcher serving canned pages keyed by url
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    failing: HashMap<String, FetchError>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
}

/// Keeps `in_flight` accurate when a fetch is dropped before it finishes
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> linkcount::fetcher::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.failing.get(url) {
            return Err(err.clone());
        }
        Ok(Bytes::from(self.pages.get(url).cloned().unwrap_or_default()))
    }
}

fn page_with_links(n: usize) -> String {
    (0..n)
        .map(|i| {
            let scheme = if i % 2 == 0 { "https" } else { "http" };
            format!(r#"<a href="{}://link{}.example">{}</a>"#, scheme, i, i)
        })
        .collect()
}

/// Stub where target `i` has `i * 2` links and earlier targets respond last
fn stub_for(config: &Config) -> StubFetcher {
    let mut stub = StubFetcher::default();
    let total = config.targets.len() as u64;
    for (i, url) in config.targets.iter().enumerate() {
        stub.pages.insert(url.clone(), page_with_links(i * 2));
        stub.delays
            .insert(url.clone(), Duration::from_millis(3 * (total - i as u64)));
    }
    stub
}

fn build_test_app(stub: StubFetcher) -> (Router, Arc<StubFetcher>) {
    let config = Config::default();
    let fetcher = Arc::new(stub);
    let aggregator = Aggregator::new(config.registry(), fetcher.clone());
    let state = AppState::new(aggregator, CancellationToken::new());

    (router(state), fetcher)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, fetcher) = build_test_app(StubFetcher::default());

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health, HealthResponse::ok());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_links_returns_every_target_in_order() {
    let config = Config::default();
    let (app, _) = build_test_app(stub_for(&config));

    let response = app.oneshot(get("/v1/links")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let links = body["links"].as_array().unwrap();

    assert_eq!(links.len(), 10);
    for (i, entry) in links.iter().enumerate() {
        assert_eq!(entry["id"], i);
        assert_eq!(entry["url"], config.targets[i].as_str());
        assert_eq!(entry["links"], i * 2);
        assert!(entry["time"].is_string());
        assert!(entry.get("error").is_none());
    }
    assert!(body["time"].is_string());
}

#[tokio::test]
async fn test_get_links_marks_failed_target() {
    let config = Config::default();
    let mut stub = stub_for(&config);
    stub.failing.insert(
        config.targets[3].clone(),
        FetchError::Network("connection reset".into()),
    );
    let (app, _) = build_test_app(stub);

    let response = app.oneshot(get("/v1/links")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let links = body["links"].as_array().unwrap();

    assert_eq!(links.len(), 10);
    assert_eq!(links[3]["links"], 0);
    assert_eq!(links[3]["error"]["kind"], "network");
    assert_eq!(
        links.iter().filter(|entry| entry.get("error").is_some()).count(),
        1
    );
    assert_eq!(links[4]["links"], 8);
}

#[tokio::test]
async fn test_get_link_single_target() {
    let config = Config::default();
    let (app, fetcher) = build_test_app(stub_for(&config));

    let response = app.oneshot(get("/v1/link/4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let links = body["links"].as_array().unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["id"], 4);
    assert_eq!(links[0]["url"], config.targets[4].as_str());
    assert_eq!(links[0]["links"], 8);
    assert!(body["time"].is_string());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_link_out_of_range() {
    let (app, fetcher) = build_test_app(StubFetcher::default());

    let response = app.oneshot(get("/v1/link/10")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_TARGET");
    assert!(body["message"].as_str().unwrap().contains("0..10"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_link_negative_id() {
    let (app, fetcher) = build_test_app(StubFetcher::default());

    let response = app.oneshot(get("/v1/link/-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_TARGET");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_link_non_numeric_id() {
    let (app, fetcher) = build_test_app(StubFetcher::default());

    let response = app.oneshot(get("/v1/link/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_TARGET");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_batch_requests_are_independent() {
    let config = Config::default();
    let (app, fetcher) = build_test_app(stub_for(&config));

    let (first, second) = tokio::join!(
        ServiceExt::<Request<Body>>::oneshot(app.clone(), get("/v1/links")),
        ServiceExt::<Request<Body>>::oneshot(app, get("/v1/links")),
    );

    let first = json_body(first.unwrap()).await;
    let second = json_body(second.unwrap()).await;

    assert_eq!(first["links"].as_array().unwrap().len(), 10);
    assert_eq!(second["links"].as_array().unwrap().len(), 10);
    for i in 0..10 {
        assert_eq!(first["links"][i]["id"], second["links"][i]["id"]);
        assert_eq!(first["links"][i]["links"], second["links"][i]["links"]);
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn test_dropped_links_request_aborts_fetches() {
    let config = Config::default();
    let mut stub = stub_for(&config);
    for url in &config.targets {
        stub.delays.insert(url.clone(), Duration::from_secs(30));
    }
    let (app, fetcher) = build_test_app(stub);

    let request = app.oneshot(get("/v1/links"));
    let outcome = tokio::time::timeout(Duration::from_millis(50), request).await;
    assert!(outcome.is_err());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 10);

    for _ in 0..100 {
        if fetcher.in_flight.load(Ordering::SeqCst) == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = build_test_app(StubFetcher::default());

    let response = app.oneshot(get("/v2/links")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
