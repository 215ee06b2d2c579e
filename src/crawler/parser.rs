//! HTML link extraction
//!
//! Collects the `href` of every anchor on a page and normalizes it into a
//! [`LinkCandidate`]. Script execution is not attempted; only links present
//! in the served HTML are seen.

use crate::url::LinkCandidate;
use scraper::{Html, Selector};
use url::Url;

/// Extracts all usable anchor links from an HTML document
///
/// Links are resolved against `base_url`, stripped of query and fragment,
/// and returned in document order. Duplicates are kept; deduplication is the
/// traversal's job.
///
/// **Dropped silently:** empty hrefs, unparsable hrefs, and anything that is
/// not HTTP(S) after resolution (`mailto:`, `tel:`, `javascript:`, `data:`).
///
/// # Example
///
/// ```
/// use imprint_scout::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/impressum">Impressum</a><a href="mailto:a@b.de">Mail</a>"#;
/// let base = Url::parse("https://verein.de/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://verein.de/impressum");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| LinkCandidate::from_href(href, base_url))
        .collect()
}
