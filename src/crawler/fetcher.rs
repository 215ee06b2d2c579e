//! HTTP page fetcher for the imprint crawler
//!
//! Every failure is folded into [`FetchResult::Failed`]; the traversal treats
//! a failed page as a page without links. Redirects are not followed here:
//! they come back as [`FetchResult::Redirect`] so the traversal can check the
//! target against the pages it already fetched.

use crate::config::HttpConfig;
use reqwest::{header, redirect::Policy, Client};
use url::Url;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML (or untyped) page
    Ok {
        /// URL the body was served from; relative links resolve against it
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// 3xx answer with a usable `Location`
    Redirect {
        /// Absolute redirect target
        location: Url,
    },

    /// The page could not be used
    Failed {
        /// Error description
        reason: String,
    },
}

impl FetchResult {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Builds the HTTP client used for page fetches
///
/// # Example
///
/// ```no_run
/// use imprint_scout::config::HttpConfig;
/// use imprint_scout::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or missing Content-Type | `Ok` |
/// | 2xx with another Content-Type | `Failed` |
/// | 3xx with a resolvable `Location` | `Redirect` |
/// | 3xx without one, any other status | `Failed` |
/// | Timeout / connection / TLS error | `Failed` |
/// | Body not decodable | `Failed` |
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return FetchResult::failed("Request timeout"),
        Err(e) if e.is_connect() => {
            return FetchResult::failed(format!("Connection failed: {}", e))
        }
        Err(e) => return FetchResult::failed(e.to_string()),
    };

    let status = response.status();
    if status.is_redirection() {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| response.url().join(v).ok());
        return match location {
            Some(location) => FetchResult::Redirect { location },
            None => FetchResult::failed(format!(
                "HTTP {} without usable Location",
                status.as_u16()
            )),
        };
    }
    if !status.is_success() {
        return FetchResult::failed(format!("HTTP {}", status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    if let Some(content_type) = content_type {
        if !content_type.contains("html") {
            return FetchResult::failed(format!("Not HTML: {}", content_type));
        }
    }

    let final_url = response.url().clone();
    match response.text().await {
        Ok(body) => FetchResult::Ok { final_url, body },
        Err(e) => FetchResult::failed(format!("Failed to read body: {}", e)),
    }
}
