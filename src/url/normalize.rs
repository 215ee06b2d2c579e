use crate::resolver::Scheme;
use std::fmt;
use url::Url;

/// Prepares a raw homepage string for the HTTPS probe
///
/// # Steps
///
/// 1. Trim surrounding whitespace and lower-case everything
/// 2. Rewrite a leading `http://` to `https://`
/// 3. Prepend `https://` when no scheme is present
///
/// The result always starts with `https://`. It is not guaranteed to be a
/// valid URL; shape validation happens right before probing.
///
/// # Examples
///
/// ```
/// use imprint_scout::url::prepare_candidate;
///
/// assert_eq!(prepare_candidate("WWW.Example.COM"), "https://www.example.com");
/// assert_eq!(prepare_candidate("http://example.com/"), "https://example.com/");
/// ```
pub fn prepare_candidate(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    if let Some(rest) = lowered.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if lowered.starts_with("https://") {
        lowered
    } else {
        format!("https://{}", lowered)
    }
}

/// Rewrites a prepared candidate to the given scheme
pub fn with_scheme(candidate: &str, scheme: Scheme) -> String {
    let rest = candidate
        .strip_prefix("https://")
        .or_else(|| candidate.strip_prefix("http://"))
        .unwrap_or(candidate);
    format!("{}://{}", scheme.as_str(), rest)
}

/// A normalized absolute link: scheme, host, port and path only
///
/// Query string and fragment are stripped, so two hrefs that differ only in
/// tracking parameters or anchors collapse into the same candidate. Used both
/// as the crawl dedup key and for keyword matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkCandidate(Url);

impl LinkCandidate {
    /// Normalizes an absolute URL into a candidate
    ///
    /// Returns `None` for non-HTTP(S) URLs and URLs without a host.
    pub fn new(mut url: Url) -> Option<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return None,
        }

        url.set_query(None);
        url.set_fragment(None);
        Some(Self(url))
    }

    /// Resolves an href found on `base` into a candidate
    ///
    /// Malformed hrefs (empty, unparsable, not HTTP(S) after resolution)
    /// yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use imprint_scout::url::LinkCandidate;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://verein.de/news/").unwrap();
    /// let link = LinkCandidate::from_href("../impressum.html?lang=de#top", &base).unwrap();
    /// assert_eq!(link.as_str(), "https://verein.de/impressum.html");
    /// ```
    pub fn from_href(href: &str, base: &Url) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        base.join(href).ok().and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Lower-cased, percent-decoded form used for keyword matching
    pub fn comparison_form(&self) -> String {
        let raw = self.0.as_str();
        match urlencoding::decode(raw) {
            Ok(decoded) => decoded.to_lowercase(),
            Err(_) => raw.to_lowercase(),
        }
    }
}

impl fmt::Display for LinkCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
