//! Storage module for association records
//!
//! This module persists what the batch jobs produce:
//! - Association records with raw and resolved homepage and imprint link
//! - Problem records describing resolution and discovery failures

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::resolver::Scheme;

/// Represents an association in the database
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRecord {
    /// Association number (unique key)
    pub number: String,
    pub name: String,

    /// Homepage as supplied, before resolution
    pub raw_homepage: Option<String>,

    /// Resolved, reachable homepage
    pub homepage: Option<String>,
    pub homepage_scheme: Option<Scheme>,

    /// Discovered imprint link
    pub imprint: Option<String>,

    pub updated_at: String,
}
