//! URL handling module for Imprint-Scout
//!
//! This module provides homepage candidate preparation, link normalization,
//! site-key extraction for internal/external classification, keyword
//! matching, and HTTP(S) URL shape validation.

mod domain;
mod matcher;
mod normalize;

use crate::{UrlError, UrlResult};
use url::{Host, Url};

// Re-export main functions
pub use domain::{site_key, SiteKey};
pub use matcher::{find_by_keywords, matches_keyword};
pub use normalize::{prepare_candidate, with_scheme, LinkCandidate};

/// Longest URL accepted for storage
pub const MAX_URL_LENGTH: usize = 2083;

/// Where a discovered link points, relative to the crawl root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same site as the crawl root - may be fetched
    Internal,
    /// Different site - recorded, never fetched
    External,
}

/// Classifies a link against the crawl root's site key
pub fn classify_link(link: &LinkCandidate, root: &SiteKey) -> LinkScope {
    match site_key(link.url()) {
        Some(key) if &key == root => LinkScope::Internal,
        _ => LinkScope::External,
    }
}

/// Validates that a string is an absolute HTTP(S) URL fit for storage
///
/// # Rules
///
/// - At most [`MAX_URL_LENGTH`] bytes
/// - Parses as an absolute URL with scheme `http` or `https`
/// - Has a host; domain hosts must contain a dot (a top level domain)
///
/// # Examples
///
/// ```
/// use imprint_scout::url::validate_http_url;
///
/// assert!(validate_http_url("https://verein.de/impressum").is_ok());
/// assert!(validate_http_url("http://127.0.0.1:8080/").is_ok());
/// assert!(validate_http_url("https://localhost/").is_err());
/// assert!(validate_http_url("ftp://verein.de/").is_err());
/// ```
pub fn validate_http_url(s: &str) -> UrlResult<Url> {
    if s.len() > MAX_URL_LENGTH {
        return Err(UrlError::TooLong(s.len()));
    }

    let url = Url::parse(s).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host() {
        None => return Err(UrlError::MissingHost),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.');
            if domain.is_empty() {
                return Err(UrlError::MissingHost);
            }
            if !domain.contains('.') {
                return Err(UrlError::MissingTld(domain.to_string()));
            }
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
    }

    Ok(url)
}
