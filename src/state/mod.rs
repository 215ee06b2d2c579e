//! Per-crawl state tracking
//!
//! This module defines the working set owned by a single imprint crawl.

mod crawl_state;

pub use crawl_state::{CrawlState, LinkSet};
