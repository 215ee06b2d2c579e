use crate::url::{find_by_keywords, LinkCandidate};
use std::collections::HashSet;

/// Insertion-ordered set of links with O(1) membership checks
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    order: Vec<LinkCandidate>,
    members: HashSet<LinkCandidate>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link; returns false if it was already present
    pub fn insert(&mut self, link: LinkCandidate) -> bool {
        if self.members.contains(&link) {
            return false;
        }
        self.members.insert(link.clone());
        self.order.push(link);
        true
    }

    pub fn contains(&self, link: &LinkCandidate) -> bool {
        self.members.contains(link)
    }

    /// Links in discovery order
    pub fn as_slice(&self) -> &[LinkCandidate] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Working set of a single imprint crawl
///
/// Created at the start of one crawl and dropped at its end. Never shared
/// between crawls.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// Same-site links discovered so far
    visited_internal: LinkSet,

    /// Other-site links discovered so far (never fetched)
    visited_external: LinkSet,

    /// Pages whose fetch has been attempted
    fetched: HashSet<LinkCandidate>,

    /// Number of fetch attempts, successful or not
    visited_count: u32,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an internal link; returns true if it was not seen before
    pub fn record_internal(&mut self, link: LinkCandidate) -> bool {
        self.visited_internal.insert(link)
    }

    /// Records an external link; returns true if it was not seen before
    pub fn record_external(&mut self, link: LinkCandidate) -> bool {
        self.visited_external.insert(link)
    }

    /// Claims a page for fetching and charges it to the budget
    ///
    /// Returns false, without charging, if the page was already fetched.
    pub fn begin_fetch(&mut self, link: &LinkCandidate) -> bool {
        if !self.fetched.insert(link.clone()) {
            return false;
        }
        self.visited_count += 1;
        true
    }

    /// True once `max_pages` fetches have been attempted
    pub fn budget_exhausted(&self, max_pages: u32) -> bool {
        self.visited_count >= max_pages
    }

    pub fn visited_count(&self) -> u32 {
        self.visited_count
    }

    pub fn has_fetched(&self, link: &LinkCandidate) -> bool {
        self.fetched.contains(link)
    }

    pub fn internal(&self) -> &[LinkCandidate] {
        self.visited_internal.as_slice()
    }

    pub fn external(&self) -> &[LinkCandidate] {
        self.visited_external.as_slice()
    }

    /// Picks the best discovered link for a prioritized keyword list
    pub fn best_match<S: AsRef<str>>(&self, keywords: &[S]) -> Option<&LinkCandidate> {
        find_by_keywords(keywords, self.internal(), self.external())
    }
}
