//! HTML parsing for category listing pages
//!
//! Sub-category links are the anchors whose class contains `title`. Some
//! listing layouts use `cat-main-heading` instead, which is tried when the
//! primary selector matches nothing.

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Primary anchor selector for sub-category links
pub const PRIMARY_SELECTOR: &str = r#"a[class*="title"]"#;

/// Selector tried when the primary one matches no element
pub const FALLBACK_SELECTOR: &str = r#"a[class*="cat-main-heading"]"#;

/// Extracts the unique absolute sub-category URLs from a listing page
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base_url` - The listing page URL, used to resolve relative hrefs
///
/// # Returns
///
/// The resolved URLs in sorted order. Empty when neither selector matches.
///
/// # Example
///
/// ```
/// use trade_harvest::discovery::extract_category_links;
/// use url::Url;
///
/// let html = r#"<a class="card-title" href="/seller/chemicals/acids/">Acids</a>"#;
/// let base = Url::parse("https://www.example.com/seller/chemicals/").unwrap();
/// let links = extract_category_links(html, &base);
/// assert!(links.contains("https://www.example.com/seller/chemicals/acids/"));
/// ```
pub fn extract_category_links(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    let mut hrefs = select_hrefs(&document, PRIMARY_SELECTOR);
    if hrefs.is_empty() {
        tracing::debug!(url = %base_url, "No primary links, trying fallback selector");
        hrefs = select_hrefs(&document, FALLBACK_SELECTOR);
    }

    hrefs
        .into_iter()
        .filter_map(|href| resolve_link(&href, base_url))
        .collect()
}

/// Collects the raw `href` of every element matching `selector`
///
/// Matched anchors without an `href` still count as a match, so the fallback
/// selector is only used when the layout itself differs.
fn select_hrefs(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| element.value().attr("href").unwrap_or_default().to_string())
        .collect()
}

/// Resolves an href against the page URL
///
/// Returns None for empty hrefs, unparseable URLs and non-HTTP(S) results.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}
