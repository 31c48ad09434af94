//! Unified error type for the placement core and its collaborators.
//!
//! Engine failures (`NotFound`, `CapacityExceeded`, `AlreadyAssigned`, `NoActiveYear`)
//! are returned as values and rendered by whatever sits in front of the core.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up (e.g. `"student"`).
        entity: &'static str,
        /// Primary key that was looked up.
        id: i64,
    },

    /// The classroom already holds as many assignments as its capacity allows.
    #[error("Classroom {classroom} is at full capacity ({capacity} students)")]
    CapacityExceeded {
        /// Classroom name
        classroom: String,
        /// Configured capacity
        capacity: i32,
    },

    /// The student already holds a placement for this academic year.
    #[error("Student {student_id} is already assigned to a classroom for academic year {academic_year_id}")]
    AlreadyAssigned {
        /// Student primary key
        student_id: i64,
        /// Academic year primary key
        academic_year_id: i64,
    },

    /// No academic year is flagged active.
    #[error("No active academic year found. Please contact your administrator.")]
    NoActiveYear,

    /// Storage contention or timeout; retrying the whole operation is safe.
    #[error("Transient storage failure: {message}")]
    TransientStoreFailure {
        /// Underlying driver message
        message: String,
    },

    /// Input rejected by a store operation.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Details about the configuration failure
        message: String,
    },

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(DbErr),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may simply retry the operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreFailure { .. })
    }

    pub(crate) const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Returns true for SQLite busy/locked conditions and pool acquire timeouts.
fn is_contention(err: &DbErr) -> bool {
    if matches!(err, DbErr::ConnectionAcquire(_)) {
        return true;
    }
    let message = err.to_string();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("SQLITE_BUSY")
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::TransientStoreFailure {
                message: err.to_string(),
            }
        } else {
            Self::Database(err)
        }
    }
}

/// Maps a unique-constraint violation to a `Validation` error with `message`,
/// leaving every other database error to the default conversion.
pub(crate) fn unique_violation_as(err: DbErr, message: impl FnOnce() -> String) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::validation(message()),
        _ => Error::from(err),
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
