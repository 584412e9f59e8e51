//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Record exists but is in a state that forbids the operation.
    #[error("{entity} {id} conflict: {reason}")]
    Conflict {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// Input rejected before reaching the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn conflict(
        entity: &'static str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DatabaseError::Conflict {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Map a unique-constraint violation to [`DatabaseError::AlreadyExists`].
pub(crate) fn map_unique(e: sqlx::Error, entity: &'static str, id: &str) -> DatabaseError {
    if is_unique_violation(&e) {
        return DatabaseError::AlreadyExists {
            entity,
            id: id.to_string(),
        };
    }
    DatabaseError::Sqlx(e)
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
