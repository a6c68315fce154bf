use diesel::result::{DatabaseErrorKind, Error};

use crate::app::AppError;

pub mod blog;
pub mod comment;
pub mod user;

/// Reclassifies a unique-constraint violation as a validation failure.
/// The store's unique index is the final arbiter for writes racing past
/// the service-level duplicate check.
pub(crate) fn on_unique_violation(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            AppError::Validation(message.to_string())
        }
        other => other,
    }
}

/// Reclassifies a foreign-key violation as a validation failure.
pub(crate) fn on_foreign_key_violation(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            AppError::Validation(message.to_string())
        }
        other => other,
    }
}
