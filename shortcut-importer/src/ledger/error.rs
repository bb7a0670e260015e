//! Ledger error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the migration ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// SQLite error.
    #[error("Ledger database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored target id does not fit the id type.
    #[error("Ledger entry {key} holds an invalid target id {value}")]
    InvalidTargetId { key: String, value: i64 },

    /// A target id is too large to store.
    #[error("Target id {id} for {key} does not fit in the ledger")]
    TargetIdOutOfRange { key: String, id: u64 },
}
