use url::Url;

/// Identity of a site for internal/external link classification
///
/// Two URLs belong to the same site when their hosts match (case-insensitive,
/// ignoring a leading `www.`) and their explicit ports match. Default ports
/// are not explicit, so `http://` and `https://` links to the same host are
/// the same site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    host: String,
    port: Option<u16>,
}

impl SiteKey {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

/// Extracts the site key from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use imprint_scout::url::site_key;
///
/// let a = site_key(&Url::parse("https://www.Verein.de/").unwrap()).unwrap();
/// let b = site_key(&Url::parse("http://verein.de/kontakt").unwrap()).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn site_key(url: &Url) -> Option<SiteKey> {
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);

    Some(SiteKey {
        host,
        port: url.port(),
    })
}
