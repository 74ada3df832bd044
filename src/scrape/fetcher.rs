//! Listing API page fetcher
//!
//! This module handles the HTTP side of a scrape:
//! - Building the shared HTTP client with a browser-like identity
//! - Requesting one page of a sub-category from the listing API
//! - Classifying failures as transport or malformed-response errors
//!
//! No retries happen here; retry policy belongs to the controller.

use crate::config::{ApiConfig, ClientConfig};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, REFERER};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-2xx status
    #[error("transport error: {0}")]
    Transport(String),

    /// Body did not have the expected structure
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Records of one page, or the reason the page failed
pub type PageResult = Result<Vec<Value>, FetchError>;

/// One request per page against the paginated listing API
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `page` (1-based) of the sub-category at `slug`
    ///
    /// An empty vector means there is no more data.
    async fn fetch(&self, slug: &str, page: u32, page_size: u32) -> PageResult;
}

/// Builds the HTTP client shared by discovery and scraping
///
/// The client is reused for every request of a run so connections are pooled.
///
/// # Example
///
/// ```no_run
/// use trade_harvest::config::ClientConfig;
/// use trade_harvest::scrape::build_http_client;
///
/// let config = ClientConfig {
///     user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
///     discovery_timeout_secs: 15,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by the real listing API
#[derive(Debug, Clone)]
pub struct ApiFetcher {
    client: Client,
    base_url: Url,
    referer: String,
    timeout: Duration,
}

impl ApiFetcher {
    /// Creates a fetcher for the configured endpoint
    pub fn new(client: Client, config: &ApiConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            referer: config.referer.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl PageFetcher for ApiFetcher {
    async fn fetch(&self, slug: &str, page: u32, page_size: u32) -> PageResult {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("url", slug.to_string()),
                ("page", page.to_string()),
                ("per_page", page_size.to_string()),
            ])
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(REFERER, self.referer.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status.as_u16())));
        }

        let body = response.text().await.map_err(|e| classify_transport(&e))?;

        parse_listing(&body)
    }
}

/// Extracts the record list from a listing API body
///
/// The records live at `listing.data`. A missing or null list is the API's
/// way of saying there is nothing more and yields an empty page.
///
/// # Example
///
/// ```
/// use trade_harvest::scrape::parse_listing;
///
/// let records = parse_listing(r#"{"listing": {"data": [{"product_id": "p1"}]}}"#).unwrap();
/// assert_eq!(records.len(), 1);
/// assert!(parse_listing(r#"{"listing": {}}"#).unwrap().is_empty());
/// assert!(parse_listing("<html>").is_err());
/// ```
pub fn parse_listing(body: &str) -> PageResult {
    let mut payload: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if !payload.is_object() {
        return Err(FetchError::Malformed(
            "top-level JSON value is not an object".to_string(),
        ));
    }

    let data = payload
        .get_mut("listing")
        .and_then(|listing| listing.get_mut("data"))
        .map(Value::take);

    match data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(other) => Err(FetchError::Malformed(format!(
            "listing.data is not a list: {}",
            value_kind(&other)
        ))),
    }
}

fn classify_transport(error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Transport("request timeout".to_string())
    } else if error.is_connect() {
        FetchError::Transport(format!("connection failed: {}", error))
    } else if error.is_decode() || error.is_body() {
        FetchError::Transport(format!("failed to read body: {}", error))
    } else {
        FetchError::Transport(error.to_string())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
