//! Persistent record of migrated issues.
//!
//! The ledger maps a source [`IssueKey`] to the id of the story or epic it
//! became. It is the only memory the importer has across runs, so every write
//! is committed before the call returns.

mod error;

pub use error::LedgerError;

use crate::types::IssueKey;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQLite-backed migration ledger.
#[derive(Debug)]
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Opens (or creates) the ledger at the given file path.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the database cannot be opened or initialized.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        debug!(path = %path.display(), "Opening ledger");
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=FULL;\
             PRAGMA busy_timeout=5000;",
        )?;
        Self::init(conn)
    }

    /// Opens the ledger belonging to one workspace: `<base>-<workspace>.sqlite3`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the database cannot be opened or initialized.
    pub fn open_for_workspace(base: &str, workspace: &str) -> Result<Self, LedgerError> {
        Self::open(&workspace_file(base, workspace))
    }

    /// Opens an in-memory ledger (for tests and dry runs).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS migrated (
                issue_key   TEXT PRIMARY KEY,
                target_id   INTEGER NOT NULL,
                migrated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Returns the target id recorded for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure.
    pub fn get(&self, key: &IssueKey) -> Result<Option<u64>, LedgerError> {
        let ledger_key = key.ledger_key();
        let stored: Option<i64> = self
            .conn
            .query_row(
                "SELECT target_id FROM migrated WHERE issue_key = ?1",
                params![ledger_key],
                |row| row.get(0),
            )
            .optional()?;

        stored
            .map(|value| {
                u64::try_from(value).map_err(|_| LedgerError::InvalidTargetId {
                    key: ledger_key.clone(),
                    value,
                })
            })
            .transpose()
    }

    /// Returns true if `key` has been migrated.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure.
    pub fn contains(&self, key: &IssueKey) -> Result<bool, LedgerError> {
        Ok(self.get(key)?.is_some())
    }

    /// Records `key → target_id` unless the key already has an entry.
    ///
    /// Returns true if the entry was written; existing entries are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure, or when `target_id` does not
    /// fit a SQLite integer.
    pub fn record(&mut self, key: &IssueKey, target_id: u64) -> Result<bool, LedgerError> {
        let target_id = to_sql_id(key, target_id)?;
        let inserted = self.conn.execute(
            "INSERT INTO migrated (issue_key, target_id, migrated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(issue_key) DO NOTHING",
            params![key.ledger_key(), target_id, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    /// Records `key → target_id`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure.
    pub fn replace(&mut self, key: &IssueKey, target_id: u64) -> Result<(), LedgerError> {
        let target_id = to_sql_id(key, target_id)?;
        self.conn.execute(
            "INSERT INTO migrated (issue_key, target_id, migrated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(issue_key) DO UPDATE SET
                target_id = excluded.target_id,
                migrated_at = excluded.migrated_at",
            params![key.ledger_key(), target_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Returns the number of recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure.
    pub fn len(&self) -> Result<usize, LedgerError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM migrated", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Returns true if nothing has been recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on database failure.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

/// Returns the ledger file path for a workspace.
#[must_use]
pub fn workspace_file(base: &str, workspace: &str) -> PathBuf {
    PathBuf::from(format!("{base}-{workspace}.sqlite3"))
}

fn to_sql_id(key: &IssueKey, id: u64) -> Result<i64, LedgerError> {
    i64::try_from(id).map_err(|_| LedgerError::TargetIdOutOfRange {
        key: key.ledger_key(),
        id,
    })
}
