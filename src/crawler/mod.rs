//! Crawler module for imprint discovery
//!
//! This module contains the site crawler, including:
//! - HTTP page fetching with soft failure handling
//! - HTML anchor extraction
//! - The bounded work-list traversal and keyword selection

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{SiteCrawler, DEFAULT_MAX_PAGES};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use parser::extract_links;
