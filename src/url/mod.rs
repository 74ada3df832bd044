//! Sub-category targets
//!
//! A target is identified by the path of a discovered sub-category URL. The
//! listing API is queried with that path, and its last segment names the
//! target's bronze file.

use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// One sub-category to be fully paginated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    slug: String,
    source_url: String,
}

impl Target {
    /// Builds a target from an absolute sub-category URL
    ///
    /// # Examples
    ///
    /// ```
    /// use trade_harvest::url::Target;
    ///
    /// let target = Target::from_url("https://www.example.com/seller/chemicals/acids/").unwrap();
    /// assert_eq!(target.slug(), "/seller/chemicals/acids/");
    /// assert_eq!(target.name(), "acids");
    /// ```
    pub fn from_url(raw: &str) -> UrlResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let slug = url.path().to_string();
        if slug.trim_matches('/').is_empty() {
            return Err(UrlError::MissingPath(raw.to_string()));
        }

        Ok(Self {
            slug,
            source_url: url.to_string(),
        })
    }

    /// Builds a target directly from a path slug
    pub fn from_slug(slug: impl Into<String>) -> UrlResult<Self> {
        let slug = slug.into();
        if slug.trim_matches('/').is_empty() {
            return Err(UrlError::MissingPath(slug));
        }
        Ok(Self {
            source_url: slug.clone(),
            slug,
        })
    }

    /// The path sent to the listing API
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The URL (or slug) this target was built from
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The last non-empty path segment
    pub fn name(&self) -> &str {
        self.slug
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .unwrap_or_default()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug)
    }
}
