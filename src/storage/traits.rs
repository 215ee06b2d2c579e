//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::problems::{Problem, ProblemRecorder};
use crate::resolver::ResolvedUrl;
use crate::storage::AssociationRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Association not found: {0}")]
    AssociationNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Holds association records and the problems recorded against them.
pub trait Storage: ProblemRecorder<Error = StorageError> {
    // ===== Associations =====

    /// Inserts an association or updates its name and raw homepage
    ///
    /// Resolved homepage and imprint are left untouched on update.
    fn upsert_association(
        &mut self,
        number: &str,
        name: &str,
        raw_homepage: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets an association by number
    fn get_association(&self, number: &str) -> StorageResult<AssociationRecord>;

    /// Lists associations ordered by number
    ///
    /// `limit = None` returns everything after `skip`.
    fn list_associations(&self, skip: u32, limit: Option<u32>)
        -> StorageResult<Vec<AssociationRecord>>;

    /// Stores the outcome of resolving an association's homepage
    ///
    /// An unreachable outcome clears the stored homepage.
    fn set_homepage(&mut self, number: &str, resolved: &ResolvedUrl) -> StorageResult<()>;

    /// Stores the discovered imprint link
    fn set_imprint(&mut self, number: &str, imprint: &str) -> StorageResult<()>;

    // ===== Problems =====

    /// Lists recorded problems, optionally for one association only
    fn list_problems(&self, association: Option<&str>) -> StorageResult<Vec<Problem>>;

    /// Counts all recorded problems
    fn count_problems(&self) -> StorageResult<u64>;
}
