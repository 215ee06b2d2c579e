//! Imprint crawl coordination
//!
//! Runs the bounded link traversal of one site and picks the imprint link
//! from what it discovered. The traversal is an explicit work-list:
//! 1. Fetch the root page
//! 2. Extract and classify every anchor (internal or external)
//! 3. Queue newly discovered internal pages, record external ones
//! 4. Repeat until the queue is empty, the page budget is spent, or the
//!    caller cancels
//! 5. Scan the discovered links with the prioritized keyword list

use crate::config::HttpConfig;
use crate::crawler::parser::extract_links;
use crate::crawler::{build_http_client, fetch_page, FetchResult};
use crate::state::CrawlState;
use crate::url::{classify_link, site_key, LinkCandidate, LinkScope};
use reqwest::Client;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default page-fetch budget for one crawl
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Crawls association homepages for keyword-matching links
///
/// The crawler itself is stateless; each call builds its own [`CrawlState`],
/// so one crawler can serve concurrent crawls of different sites.
#[derive(Debug, Clone)]
pub struct SiteCrawler {
    client: Client,
}

impl SiteCrawler {
    /// Creates a crawler with its own HTTP client
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Finds the first link whose path contains a keyword
    ///
    /// # Arguments
    ///
    /// * `root` - The homepage to start from
    /// * `keywords` - Keywords ordered by priority, highest first
    /// * `max_pages` - Page-fetch budget (see [`DEFAULT_MAX_PAGES`])
    ///
    /// # Returns
    ///
    /// The matching link, or `None` when nothing matched or the root could
    /// not be fetched at all.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imprint_scout::config::{HttpConfig, DEFAULT_KEYWORDS};
    /// use imprint_scout::crawler::SiteCrawler;
    /// use url::Url;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = SiteCrawler::new(&HttpConfig::default())?;
    /// let root = Url::parse("https://musikverein-beispiel.de/")?;
    /// if let Some(imprint) = crawler.find_link_by_keyword(&root, DEFAULT_KEYWORDS, 5).await {
    ///     println!("Imprint: {}", imprint);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_link_by_keyword<S: AsRef<str>>(
        &self,
        root: &Url,
        keywords: &[S],
        max_pages: u32,
    ) -> Option<LinkCandidate> {
        self.find_link_by_keyword_with_cancel(root, keywords, max_pages, &CancellationToken::new())
            .await
    }

    /// Same as [`find_link_by_keyword`](Self::find_link_by_keyword), but
    /// stops traversing as soon as `cancel` fires
    ///
    /// A cancelled crawl still scans the links discovered before
    /// cancellation.
    pub async fn find_link_by_keyword_with_cancel<S: AsRef<str>>(
        &self,
        root: &Url,
        keywords: &[S],
        max_pages: u32,
        cancel: &CancellationToken,
    ) -> Option<LinkCandidate> {
        let state = self.crawl(root, max_pages, cancel).await;
        let found = state.best_match(keywords).cloned();

        match &found {
            Some(link) => tracing::debug!("Keyword match for {}: {}", root, link),
            None => tracing::debug!(
                "No keyword match for {} ({} internal, {} external links)",
                root,
                state.internal().len(),
                state.external().len()
            ),
        }

        found
    }

    /// Runs the bounded traversal and returns the final crawl state
    ///
    /// The budget is checked before every fetch, so `visited_count` never
    /// exceeds `max_pages`. Failed fetches and redirect hops still count
    /// against the budget. An internal redirect target is queued ahead of
    /// everything else unless it was already fetched; external targets are
    /// recorded like external links.
    pub async fn crawl(
        &self,
        root: &Url,
        max_pages: u32,
        cancel: &CancellationToken,
    ) -> CrawlState {
        let mut state = CrawlState::new();

        let (Some(root_link), Some(root_key)) = (LinkCandidate::new(root.clone()), site_key(root))
        else {
            tracing::debug!("Crawl root {} is not an HTTP(S) URL", root);
            return state;
        };

        tracing::debug!("Starting imprint crawl of {} (budget {})", root, max_pages);

        let mut frontier = VecDeque::from([root_link]);

        while let Some(page) = frontier.pop_front() {
            if cancel.is_cancelled() {
                tracing::debug!("Crawl of {} cancelled", root);
                break;
            }
            if state.budget_exhausted(max_pages) {
                tracing::trace!("Budget of {} pages spent for {}", max_pages, root);
                break;
            }
            if !state.begin_fetch(&page) {
                continue;
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = fetch_page(&self.client, page.url()) => Some(result),
            };
            let Some(result) = result else {
                tracing::debug!("Crawl of {} cancelled during fetch of {}", root, page);
                break;
            };

            let (final_url, body) = match result {
                FetchResult::Ok { final_url, body } => (final_url, body),
                FetchResult::Redirect { location } => {
                    let Some(target) = LinkCandidate::new(location) else {
                        tracing::debug!("{} redirects to a non-HTTP(S) URL", page);
                        continue;
                    };
                    tracing::trace!("{} redirects to {}", page, target);
                    match classify_link(&target, &root_key) {
                        LinkScope::Internal => {
                            state.record_internal(target.clone());
                            if !state.has_fetched(&target) {
                                frontier.push_front(target);
                            }
                        }
                        LinkScope::External => {
                            state.record_external(target);
                        }
                    }
                    continue;
                }
                FetchResult::Failed { reason } => {
                    tracing::debug!("Fetch of {} failed: {}", page, reason);
                    continue;
                }
            };

            for link in extract_links(&body, &final_url) {
                match classify_link(&link, &root_key) {
                    LinkScope::Internal => {
                        if state.record_internal(link.clone()) && !state.has_fetched(&link) {
                            frontier.push_back(link);
                        }
                    }
                    LinkScope::External => {
                        state.record_external(link);
                    }
                }
            }
        }

        tracing::debug!(
            "Crawl of {} done after {} page(s)",
            root,
            state.visited_count()
        );

        state
    }
}
