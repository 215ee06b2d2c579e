//! Imprint-Scout: homepage resolution and imprint discovery
//!
//! This crate keeps the contact links of a member-association registry honest.
//! It turns hand-typed homepage strings into reachable absolute URLs (HTTPS
//! preferred, HTTP as fallback) and crawls each homepage for a link to the
//! site's imprint ("Impressum") page.

pub mod config;
pub mod crawler;
pub mod jobs;
pub mod problems;
pub mod resolver;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Error type of the batch jobs
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Host '{0}' has no top level domain")]
    MissingTld(String),

    #[error("URL is {0} bytes long, the limit is {max}", max = crate::url::MAX_URL_LENGTH)]
    TooLong(usize),
}

/// Errors surfaced synchronously by the URL resolver
///
/// Unreachable homepages are not errors; they resolve to
/// [`resolver::ResolvedUrl::Unreachable`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid homepage input: {0}")]
    InvalidInput(String),

    #[error("Failed to build probe client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for Imprint-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::SiteCrawler;
pub use resolver::{ResolvedUrl, Resolver, Scheme};
pub use state::CrawlState;
pub use url::LinkCandidate;
