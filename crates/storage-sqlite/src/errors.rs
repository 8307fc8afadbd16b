//! Error types for the SQLite slot store.

use thiserror::Error;

/// Errors raised while opening or using the slot store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous panic while holding the connection lock.
    #[error("slot store lock poisoned")]
    Poisoned,
}

impl From<StorageError> for vitalog_core::Error {
    fn from(err: StorageError) -> Self {
        vitalog_core::Error::storage(err.to_string())
    }
}
