//! Problem records
//!
//! When a homepage cannot be resolved or no imprint is found, the batch jobs
//! describe the failure as a [`Problem`] and hand it to a
//! [`ProblemRecorder`]. The resolver and crawler never record problems
//! themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an association record needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// The homepage string was rejected outright (empty or contains `@`)
    HomepageInvalid,
    /// Neither HTTPS nor HTTP answered with `200`
    HomepageUnreachable,
    /// Reachable over plain HTTP only
    HomepageInsecure,
    /// Reachable, but the registry entry is not written as the resolved URL
    HomepageMismatch,
    /// The crawl found no keyword-matching link
    ImprintNotFound,
    /// A link was found but is not a storable HTTP(S) URL
    ImprintInvalidUrl,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomepageInvalid => "homepage_invalid",
            Self::HomepageUnreachable => "homepage_unreachable",
            Self::HomepageInsecure => "homepage_insecure",
            Self::HomepageMismatch => "homepage_mismatch",
            Self::ImprintNotFound => "imprint_not_found",
            Self::ImprintInvalidUrl => "imprint_invalid_url",
        }
    }

    /// Parses a kind from its database representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "homepage_invalid" => Some(Self::HomepageInvalid),
            "homepage_unreachable" => Some(Self::HomepageUnreachable),
            "homepage_insecure" => Some(Self::HomepageInsecure),
            "homepage_mismatch" => Some(Self::HomepageMismatch),
            "imprint_not_found" => Some(Self::ImprintNotFound),
            "imprint_invalid_url" => Some(Self::ImprintInvalidUrl),
            _ => None,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure attached to one association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Association number the problem belongs to
    pub association: String,

    #[serde(rename = "type")]
    pub kind: ProblemKind,

    /// Free-form diagnostics (the offending URL, the error text, ...)
    pub data: serde_json::Value,

    pub recorded_at: DateTime<Utc>,
}

impl Problem {
    pub fn new(association: impl Into<String>, kind: ProblemKind, data: serde_json::Value) -> Self {
        Self {
            association: association.into(),
            kind,
            data,
            recorded_at: Utc::now(),
        }
    }
}

/// Sink for problem records
pub trait ProblemRecorder {
    type Error: std::error::Error;

    fn record_problem(&mut self, problem: &Problem) -> Result<(), Self::Error>;
}
