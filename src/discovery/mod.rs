//! Discovery of sub-category links from a category listing page

mod parser;

pub use parser::{extract_category_links, FALLBACK_SELECTOR, PRIMARY_SELECTOR};

use reqwest::Client;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

/// Fetches a listing page and extracts its sub-category links
///
/// Fetch failures and pages without matching anchors are logged and yield an
/// empty set; the caller decides whether to skip the category.
pub async fn discover_links(client: &Client, page_url: &Url, timeout: Duration) -> BTreeSet<String> {
    tracing::info!(url = %page_url, "Fetching category listing");

    let body = match fetch_listing(client, page_url, timeout).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %page_url, error = %e, "Failed to fetch listing page");
            return BTreeSet::new();
        }
    };

    let links = extract_category_links(&body, page_url);
    if links.is_empty() {
        tracing::warn!(url = %page_url, "No sub-category links found with either selector");
    } else {
        tracing::info!(url = %page_url, links = links.len(), "Discovered sub-category links");
    }
    links
}

async fn fetch_listing(
    client: &Client,
    page_url: &Url,
    timeout: Duration,
) -> Result<String, reqwest::Error> {
    client
        .get(page_url.clone())
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}
