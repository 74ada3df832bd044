//! Integration tests for the scrape core
//!
//! These tests run `ApiFetcher` against wiremock servers, and drive whole
//! batches through the retry controller with a recording pacer so no test
//! waits on real cooldowns.

use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use trade_harvest::config::{AnonymousRecords, ApiConfig, ClientConfig};
use trade_harvest::scrape::{
    build_http_client, run_batch, ApiFetcher, FetchError, LoopSettings, PageFetcher, PauseReason,
    RecordingPacer, RetryPolicy,
};
use trade_harvest::state::TargetStatus;
use trade_harvest::storage::BronzeStore;
use trade_harvest::Target;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const API_PATH: &str = "/api/listing";

fn api_config(server: &MockServer, page_size: u32) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}{}", server.uri(), API_PATH),
        page_size,
        timeout_secs: 5,
        referer: "https://www.example.com/".to_string(),
        site_root: "https://www.example.com".to_string(),
    }
}

fn fetcher_for(server: &MockServer) -> ApiFetcher {
    let client = build_http_client(&ClientConfig {
        user_agent: "TestBrowser/1.0".to_string(),
        discovery_timeout_secs: 5,
    })
    .expect("Failed to build client");
    ApiFetcher::new(client, &api_config(server, 5)).expect("Failed to build fetcher")
}

fn ids(prefix: &str, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("{}{}", prefix, i)).collect()
}

fn listing(ids: &[String]) -> ResponseTemplate {
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({"product_id": id, "product_name": format!("Item {}", id), "is_product_record": 1}))
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": data}}))
}

fn empty_listing() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": []}}))
}

/// Serves queued responses per `url` query value; exhausted queues serve an empty page
#[derive(Default)]
struct ScriptedApi {
    scripts: Mutex<HashMap<String, VecDeque<ResponseTemplate>>>,
}

impl ScriptedApi {
    fn push(self, slug: &str, response: ResponseTemplate) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(slug.to_string())
            .or_default()
            .push_back(response);
        self
    }
}

impl Respond for ScriptedApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let slug = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        self.scripts
            .lock()
            .unwrap()
            .get_mut(&slug)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(empty_listing)
    }
}

#[tokio::test]
async fn test_fetch_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", "/seller/chemicals/acids/"))
        .and(query_param("page", "3"))
        .and(query_param("per_page", "5"))
        .and(header("referer", "https://www.example.com/"))
        .and(header("user-agent", "TestBrowser/1.0"))
        .respond_with(listing(&ids("p", 0..2)))
        .expect(1)
        .mount(&server)
        .await;

    let records = fetcher_for(&server)
        .fetch("/seller/chemicals/acids/", 3, 5)
        .await
        .expect("Fetch should succeed");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["product_id"], "p0");
}

#[tokio::test]
async fn test_fetch_classifies_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("url", "/s/down/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", "/s/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", "/s/shape/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": "oops"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", "/s/end/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": null}})))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);

    assert_eq!(
        fetcher.fetch("/s/down/", 1, 5).await,
        Err(FetchError::Transport("HTTP 503".to_string()))
    );
    assert!(matches!(
        fetcher.fetch("/s/html/", 1, 5).await,
        Err(FetchError::Malformed(_))
    ));
    assert!(matches!(
        fetcher.fetch("/s/shape/", 1, 5).await,
        Err(FetchError::Malformed(_))
    ));
    assert_eq!(fetcher.fetch("/s/end/", 1, 5).await, Ok(vec![]));
}

#[tokio::test]
async fn test_fetch_after_server_shutdown_is_transport() {
    let server = MockServer::start().await;
    let fetcher = fetcher_for(&server);
    drop(server);

    assert!(matches!(
        fetcher.fetch("/s/a/", 1, 5).await,
        Err(FetchError::Transport(_))
    ));
}

#[tokio::test]
async fn test_batch_with_shallow_and_deep_outages() {
    let server = MockServer::start().await;

    // A: two full pages, then the data ends
    // B: outage on page 2, three items on the retry
    // C: 21 pages of new items, then an outage too deep to retry
    let mut api = ScriptedApi::default()
        .push("/seller/x/a/", listing(&ids("a", 0..5)))
        .push("/seller/x/a/", listing(&ids("a", 5..10)))
        .push("/seller/x/b/", listing(&ids("b", 0..2)))
        .push("/seller/x/b/", ResponseTemplate::new(500))
        .push("/seller/x/b/", listing(&ids("b", 0..3)));
    for page in 0..21 {
        api = api.push("/seller/x/c/", listing(&ids("c", page * 5..page * 5 + 5)));
    }
    api = api.push("/seller/x/c/", ResponseTemplate::new(502));

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(api)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut store = BronzeStore::new(dir.path().join("x")).unwrap();
    let targets: Vec<Target> = ["/seller/x/a/", "/seller/x/b/", "/seller/x/c/"]
        .iter()
        .map(|slug| Target::from_slug(*slug).unwrap())
        .collect();

    let pacer = RecordingPacer::new();
    let settings = LoopSettings {
        page_size: 5,
        page_delay: Duration::from_secs(3),
        stagnation_threshold: 3,
        anonymous_records: AnonymousRecords::KeepFirst,
    };
    let report = run_batch(
        &targets,
        &fetcher_for(&server),
        &pacer,
        &mut store,
        settings,
        RetryPolicy::default(),
    )
    .await;

    assert_eq!(report.tally.unique_products, 13);
    assert_eq!(report.tally.outages, 1);
    assert_eq!(report.tally.retries, 1);
    assert_eq!(report.tally.completed_targets, 2);
    assert_eq!(report.records.len(), 13);

    let statuses: Vec<_> = report.targets.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            TargetStatus::Completed,
            TargetStatus::Completed,
            TargetStatus::Outage
        ]
    );
    assert_eq!(report.targets[1].attempts, 2);
    assert_eq!(report.targets[2].attempts, 1);
    assert_eq!(report.targets[2].last_page, 22);

    assert_eq!(pacer.count(PauseReason::RetryCooldown), 1);
    assert!(pacer
        .pauses()
        .iter()
        .any(|p| *p == (PauseReason::RetryCooldown, Duration::from_secs(120))));

    // Only completed targets reach the bronze layer
    assert!(dir.path().join("x/a.json").exists());
    assert!(dir.path().join("x/b.json").exists());
    assert!(!dir.path().join("x/c.json").exists());

    let b: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("x/b.json")).unwrap())
            .unwrap();
    assert_eq!(b.len(), 3);
}

#[tokio::test]
async fn test_stagnating_target_stops_early() {
    let server = MockServer::start().await;

    // The API keeps repeating the same page; the loop must stop after
    // three pages without new products
    let repeated = ids("r", 0..5);
    let mut api = ScriptedApi::default();
    for _ in 0..10 {
        api = api.push("/seller/x/loop/", listing(&repeated));
    }

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(api)
        .expect(4)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut store = BronzeStore::new(dir.path()).unwrap();
    let pacer = RecordingPacer::new();

    let report = run_batch(
        &[Target::from_slug("/seller/x/loop/").unwrap()],
        &fetcher_for(&server),
        &pacer,
        &mut store,
        LoopSettings {
            page_size: 5,
            ..LoopSettings::default()
        },
        RetryPolicy::default(),
    )
    .await;

    assert_eq!(report.tally.unique_products, 5);
    assert_eq!(report.tally.retries, 0);
    assert_eq!(report.targets[0].last_page, 4);
    assert_eq!(pacer.count(PauseReason::BetweenPages), 3);
}
