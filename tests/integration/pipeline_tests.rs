//! Integration tests for the full pipeline
//!
//! A wiremock server plays both the category listing site and the listing
//! API. Outputs go to a temporary directory.

use serde_json::{json, Value};
use std::path::Path;
use trade_harvest::config::{ApiConfig, CategoryEntry, ClientConfig, Config, OutputConfig, ScrapeConfig};
use trade_harvest::flatten::FlatProduct;
use trade_harvest::output::load_statistics;
use trade_harvest::pipeline::Pipeline;
use trade_harvest::state::TargetStatus;
use trade_harvest::storage::{read_links_csv, Ledger, RunStatus};
use trade_harvest::HarvestError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/api/listing";

/// Creates a test configuration pointing every URL at the mock server
fn create_test_config(server: &MockServer, out: &Path, categories: &[&str]) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), API_PATH),
            page_size: 50,
            timeout_secs: 5,
            referer: format!("{}/", server.uri()),
            site_root: "https://www.example.com".to_string(),
        },
        client: ClientConfig {
            user_agent: "TestBrowser/1.0".to_string(),
            discovery_timeout_secs: 5,
        },
        scrape: ScrapeConfig {
            page_delay_ms: 0,
            retry_cooldown_ms: 0,
            ..ScrapeConfig::default()
        },
        output: OutputConfig {
            bronze_path: out.join("bronze").display().to_string(),
            silver_path: out.join("silver").display().to_string(),
            ledger_path: out.join("ledger.db").display().to_string(),
        },
        categories: categories
            .iter()
            .map(|name| CategoryEntry {
                name: name.to_string(),
                url: format!("{}/seller/{}/", server.uri(), name),
            })
            .collect(),
    }
}

fn product(id: &str, is_product: u8) -> Value {
    json!({
        "product_id": id,
        "product_name": format!("Product {}", id),
        "co_name": "Acme Industries",
        "prod_url": format!("/products/{}.html", id),
        "profile_url": "/acme/",
        "is_product_record": is_product,
        "custom_field_data_meta_info": {
            "Trade_Information": [
                {"label_name": "Delivery Time", "value": "7 Days"}
            ]
        }
    })
}

async fn mount_listing_page(server: &MockServer, category: &str, subs: &[&str]) {
    let anchors: String = subs
        .iter()
        .map(|sub| {
            format!(
                r#"<a class="card-title" href="/seller/{}/{}/">{}</a>"#,
                category, sub, sub
            )
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/seller/{}/", category)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", anchors))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves `records` on page 1 of `slug` and an empty page afterwards
async fn mount_api_target(server: &MockServer, slug: &str, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", slug))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": records}})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", slug))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listing": {"data": []}})))
        .mount(server)
        .await;
}

async fn mount_chemicals(server: &MockServer) {
    mount_listing_page(server, "chemicals", &["acids", "solvents"]).await;
    mount_api_target(
        server,
        "/seller/chemicals/acids/",
        vec![product("a1", 1), product("a2", 1), product("banner", 0)],
    )
    .await;
    mount_api_target(server, "/seller/chemicals/solvents/", vec![product("s1", 1)]).await;
}

fn silver_rows(out: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(out.join("silver").join("data_raw.csv")).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn test_full_pipeline_single_category() {
    let server = MockServer::start().await;
    mount_chemicals(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server, dir.path(), &["chemicals"]);

    let mut pipeline = Pipeline::new(config, "test_hash".to_string()).expect("Failed to create pipeline");
    let summary = pipeline.run(&[]).await.expect("Pipeline should succeed");

    // Stage 1: links CSV, sorted
    let links = read_links_csv(
        &dir.path()
            .join("bronze/chemicals/chemicals_links.csv"),
    )
    .unwrap();
    assert_eq!(
        links,
        vec![
            format!("{}/seller/chemicals/acids/", server.uri()),
            format!("{}/seller/chemicals/solvents/", server.uri()),
        ]
    );

    // Stage 2: bronze keeps every raw record, banners included
    let acids: Vec<Value> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("bronze/chemicals/acids.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(acids.len(), 3);
    assert!(dir.path().join("bronze/chemicals/solvents.json").exists());

    // Stage 3: only product records reach silver
    let rows = silver_rows(dir.path());
    assert_eq!(rows.len(), 3);

    let col = |name: &str| FlatProduct::FIELDS.iter().position(|f| *f == name).unwrap();
    assert_eq!(&rows[0][col("product_id")], "a1");
    assert_eq!(&rows[0][col("sub_category")], "acids");
    assert_eq!(&rows[0][col("main_category")], "chemicals");
    assert_eq!(
        &rows[0][col("prod_url")],
        "https://www.example.com/products/a1.html"
    );
    assert_eq!(&rows[0][col("delivery_time")], "7 Days");
    assert_eq!(&rows[2][col("sub_category")], "solvents");

    // Summary
    assert_eq!(summary.categories.len(), 1);
    assert_eq!(summary.categories[0].links, 2);
    assert_eq!(summary.categories[0].flattened_rows, 3);
    assert!(summary.categories[0].skipped.is_none());
    assert_eq!(summary.total().unique_products, 4);
    assert_eq!(summary.total().outages, 0);
    assert_eq!(summary.silver_total_rows, 3);

    // Ledger
    let ledger = pipeline.ledger();
    let run = ledger.get_run(summary.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test_hash");

    let stats = load_statistics(ledger).unwrap().unwrap();
    assert_eq!(stats.count(TargetStatus::Completed), 2);
    assert_eq!(stats.total_items, 4);
    assert!(stats.failures.is_empty());
}

#[tokio::test]
async fn test_pipeline_skips_failing_category() {
    let server = MockServer::start().await;
    mount_chemicals(&server).await;

    Mock::given(method("GET"))
        .and(path("/seller/machinery/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server, dir.path(), &["machinery", "chemicals"]);

    let mut pipeline = Pipeline::new(config, "h".to_string()).unwrap();
    let summary = pipeline.run(&[]).await.unwrap();

    assert_eq!(summary.categories.len(), 2);
    assert_eq!(summary.categories[0].name, "machinery");
    assert!(summary.categories[0].skipped.is_some());
    assert_eq!(summary.categories[0].links, 0);
    assert!(!dir
        .path()
        .join("bronze/machinery/machinery_links.csv")
        .exists());

    assert_eq!(summary.categories[1].flattened_rows, 3);
    assert_eq!(summary.silver_total_rows, 3);
}

#[tokio::test]
async fn test_pipeline_outage_recorded_in_ledger() {
    let server = MockServer::start().await;
    mount_listing_page(&server, "pumps", &["rotary", "piston"]).await;
    mount_api_target(&server, "/seller/pumps/rotary/", vec![product("r1", 1)]).await;

    // Every attempt at the second target fails on page 1
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", "/seller/pumps/piston/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server, dir.path(), &["pumps"]);

    let mut pipeline = Pipeline::new(config, "h".to_string()).unwrap();
    let summary = pipeline.run(&[]).await.unwrap();

    let tally = summary.total();
    assert_eq!(tally.unique_products, 1);
    assert_eq!(tally.outages, 1);
    assert_eq!(tally.retries, 1);
    assert!(!dir.path().join("bronze/pumps/piston.json").exists());

    let outcomes = pipeline
        .ledger()
        .get_target_outcomes(summary.run_id)
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    // Links are processed in sorted order
    assert_eq!(outcomes[0].slug, "/seller/pumps/piston/");
    assert_eq!(outcomes[0].status, TargetStatus::Outage);
    assert_eq!(outcomes[0].attempts, 2);
    assert_eq!(outcomes[0].last_page, 1);
    assert_eq!(
        outcomes[0].error_message.as_deref(),
        Some("transport error: HTTP 503")
    );
    assert_eq!(outcomes[1].status, TargetStatus::Completed);
}

#[tokio::test]
async fn test_silver_accumulates_across_runs() {
    let server = MockServer::start().await;
    mount_chemicals(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server, dir.path(), &["chemicals"]);

    let first = Pipeline::new(config.clone(), "h".to_string())
        .unwrap()
        .run(&[])
        .await
        .unwrap();
    let second = Pipeline::new(config, "h".to_string())
        .unwrap()
        .run(&[])
        .await
        .unwrap();

    assert_eq!(first.silver_total_rows, 3);
    assert_eq!(second.silver_total_rows, 6);
    assert!(second.run_id > first.run_id);

    let content =
        std::fs::read_to_string(dir.path().join("silver").join("data_raw.csv")).unwrap();
    let headers = content
        .lines()
        .filter(|l| l.starts_with("product_id,"))
        .count();
    assert_eq!(headers, 1);
}

#[tokio::test]
async fn test_unknown_category_filter() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server, dir.path(), &["chemicals"]);

    let mut pipeline = Pipeline::new(config, "h".to_string()).unwrap();
    let result = pipeline.run(&["toys".to_string()]).await;

    assert!(matches!(result, Err(HarvestError::Input(_))));
    assert_eq!(pipeline.ledger().count_runs().unwrap(), 0);
}
