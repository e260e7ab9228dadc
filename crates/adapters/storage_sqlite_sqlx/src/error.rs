//! Storage-specific error type wrapping sqlx errors.

use chatmote_domain::error::ChatmoteError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value does not fit the setting it belongs to.
    #[error("stored value {value} is out of range for {key}")]
    OutOfRange { key: String, value: i64 },
}

impl From<StorageError> for ChatmoteError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
