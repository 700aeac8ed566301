use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Errors produced by the catalog services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    /// Reclassifies a unique-constraint violation as a conflict so callers can
    /// report it without leaking driver details.
    pub fn from_insert_err(err: DbErr, conflict_message: &str) -> Self {
        match &err {
            DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(database_error)))
            | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(database_error)))
                if database_error.is_unique_violation() =>
            {
                ServiceError::Conflict(conflict_message.to_string())
            }
            _ => ServiceError::Database(err),
        }
    }
}
