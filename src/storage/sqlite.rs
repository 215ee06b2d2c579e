//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::problems::{Problem, ProblemKind, ProblemRecorder};
use crate::resolver::{ResolvedUrl, Scheme};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::AssociationRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const ASSOCIATION_COLUMNS: &str =
    "number, name, raw_homepage, homepage, homepage_scheme, imprint, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps "no row updated" to a missing association
fn ensure_updated(changed: usize, number: &str) -> StorageResult<()> {
    if changed == 0 {
        return Err(StorageError::AssociationNotFound(number.to_string()));
    }
    Ok(())
}

fn association_from_row(row: &Row<'_>) -> rusqlite::Result<AssociationRecord> {
    Ok(AssociationRecord {
        number: row.get(0)?,
        name: row.get(1)?,
        raw_homepage: row.get(2)?,
        homepage: row.get(3)?,
        homepage_scheme: row
            .get::<_, Option<String>>(4)?
            .as_deref()
            .and_then(Scheme::from_db_string),
        imprint: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Raw problem row before kind, data and timestamp are decoded
struct ProblemRow {
    association: String,
    kind: String,
    data: String,
    recorded_at: String,
}

impl ProblemRow {
    fn decode(self) -> StorageResult<Problem> {
        let kind = ProblemKind::from_db_string(&self.kind).ok_or_else(|| {
            StorageError::Serialization(format!("unknown problem type '{}'", self.kind))
        })?;
        let data = serde_json::from_str(&self.data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let recorded_at = DateTime::parse_from_rfc3339(&self.recorded_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Problem {
            association: self.association,
            kind,
            data,
            recorded_at,
        })
    }
}

impl ProblemRecorder for SqliteStorage {
    type Error = StorageError;

    fn record_problem(&mut self, problem: &Problem) -> StorageResult<()> {
        let data = serde_json::to_string(&problem.data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO problems (association_number, type, data, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                problem.association,
                problem.kind.as_str(),
                data,
                problem.recorded_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn upsert_association(
        &mut self,
        number: &str,
        name: &str,
        raw_homepage: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO associations (number, name, raw_homepage, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(number) DO UPDATE SET
                name = excluded.name,
                raw_homepage = excluded.raw_homepage,
                updated_at = excluded.updated_at",
            params![number, name, raw_homepage, now],
        )?;
        Ok(())
    }

    fn get_association(&self, number: &str) -> StorageResult<AssociationRecord> {
        let sql = format!(
            "SELECT {} FROM associations WHERE number = ?1",
            ASSOCIATION_COLUMNS
        );
        self.conn
            .query_row(&sql, params![number], association_from_row)
            .optional()?
            .ok_or_else(|| StorageError::AssociationNotFound(number.to_string()))
    }

    fn list_associations(
        &self,
        skip: u32,
        limit: Option<u32>,
    ) -> StorageResult<Vec<AssociationRecord>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);
        let sql = format!(
            "SELECT {} FROM associations ORDER BY number LIMIT ?1 OFFSET ?2",
            ASSOCIATION_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![limit, i64::from(skip)], association_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn set_homepage(&mut self, number: &str, resolved: &ResolvedUrl) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE associations
             SET homepage = ?1, homepage_scheme = ?2, updated_at = ?3
             WHERE number = ?4",
            params![
                resolved.url(),
                resolved.scheme().map(|s| s.as_str()),
                Utc::now().to_rfc3339(),
                number
            ],
        )?;
        ensure_updated(changed, number)
    }

    fn set_imprint(&mut self, number: &str, imprint: &str) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE associations SET imprint = ?1, updated_at = ?2 WHERE number = ?3",
            params![imprint, Utc::now().to_rfc3339(), number],
        )?;
        ensure_updated(changed, number)
    }

    fn list_problems(&self, association: Option<&str>) -> StorageResult<Vec<Problem>> {
        let mut stmt = self.conn.prepare(
            "SELECT association_number, type, data, recorded_at FROM problems
             WHERE ?1 IS NULL OR association_number = ?1
             ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![association], |row| {
                Ok(ProblemRow {
                    association: row.get(0)?,
                    kind: row.get(1)?,
                    data: row.get(2)?,
                    recorded_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ProblemRow::decode).collect()
    }

    fn count_problems(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM problems", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
