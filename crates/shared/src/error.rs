//! Error types for Zynkart

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZynkartError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ZynkartError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ZynkartError::NotFound("row".to_string()),
            other => ZynkartError::Database(other.to_string()),
        }
    }
}

pub type ZynkartResult<T> = Result<T, ZynkartError>;
