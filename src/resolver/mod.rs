//! URL resolver
//!
//! Turns a raw homepage string into the best reachable absolute URL. HTTPS is
//! always tried first; plain HTTP is the fallback; when neither answers the
//! result is [`ResolvedUrl::Unreachable`].

mod probe;

pub use probe::{build_probe_client, HttpProbe, Probe, ProbeOutcome};

use crate::config::HttpConfig;
use crate::url::{prepare_candidate, validate_http_url, with_scheme};
use crate::ResolveError;
use std::fmt;

/// URL scheme of a resolved homepage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }

    /// Parses a scheme from its database representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "https" => Some(Self::Https),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one homepage string
///
/// The stored URL always starts with the scheme of its variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedUrl {
    /// Reachable over HTTPS
    Https(String),
    /// HTTPS failed, reachable over plain HTTP
    Http(String),
    /// Neither scheme answered with `200`
    Unreachable,
}

impl ResolvedUrl {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Https(url) | Self::Http(url) => Some(url),
            Self::Unreachable => None,
        }
    }

    pub fn scheme(&self) -> Option<Scheme> {
        match self {
            Self::Https(_) => Some(Scheme::Https),
            Self::Http(_) => Some(Scheme::Http),
            Self::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Unreachable)
    }

    fn from_scheme(scheme: Scheme, url: String) -> Self {
        match scheme {
            Scheme::Https => Self::Https(url),
            Scheme::Http => Self::Http(url),
        }
    }
}

/// Resolves raw homepage strings by probing HTTPS, then HTTP
///
/// Holds no state between calls; one resolver can serve any number of
/// concurrent resolutions.
#[derive(Debug, Clone)]
pub struct Resolver<P = HttpProbe> {
    probe: P,
}

impl Resolver<HttpProbe> {
    /// Creates a resolver that probes over the network
    pub fn new(config: &HttpConfig) -> Result<Self, ResolveError> {
        Ok(Self::with_probe(HttpProbe::new(config)?))
    }
}

impl<P: Probe> Resolver<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Resolves a raw homepage string
    ///
    /// # Algorithm
    ///
    /// 1. Reject empty input and input containing `@` (an e-mail address or
    ///    embedded credentials; never guessed at)
    /// 2. Lower-case, force the `https://` scheme, probe
    /// 3. On any failure rewrite to `http://`, probe once more
    /// 4. On a second failure return [`ResolvedUrl::Unreachable`]
    ///
    /// Each scheme is probed exactly once, without retries.
    ///
    /// # Errors
    ///
    /// [`ResolveError::InvalidInput`] for empty or `@`-containing input.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedUrl, ResolveError> {
        if raw.trim().is_empty() {
            return Err(ResolveError::InvalidInput("empty homepage".to_string()));
        }
        if raw.contains('@') {
            return Err(ResolveError::InvalidInput(format!(
                "'{}' contains '@' (e-mail address or credentials?)",
                raw
            )));
        }

        let https_candidate = prepare_candidate(raw);
        if self.try_scheme(&https_candidate).await {
            return Ok(ResolvedUrl::from_scheme(Scheme::Https, https_candidate));
        }

        let http_candidate = with_scheme(&https_candidate, Scheme::Http);
        if self.try_scheme(&http_candidate).await {
            return Ok(ResolvedUrl::from_scheme(Scheme::Http, http_candidate));
        }

        Ok(ResolvedUrl::Unreachable)
    }

    /// Validates the candidate's shape, then probes it
    async fn try_scheme(&self, candidate: &str) -> bool {
        let url = match validate_http_url(candidate) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Candidate {} rejected before probing: {}", candidate, e);
                return false;
            }
        };

        let outcome = self.probe.probe(&url).await;
        tracing::trace!("Probe {} -> {:?}", candidate, outcome);
        outcome.is_reachable()
    }
}
