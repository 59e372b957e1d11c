//! Payment error types

use thiserror::Error;

/// Payment-specific errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Webhook signature missing")]
    WebhookSignatureMissing,

    #[error("Webhook signature verification failed")]
    WebhookSignatureInvalid,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for PaymentError {
    fn from(err: sqlx::Error) -> Self {
        PaymentError::Database(err.to_string())
    }
}

impl From<zynkart_shared::ZynkartError> for PaymentError {
    fn from(err: zynkart_shared::ZynkartError) -> Self {
        PaymentError::Database(err.to_string())
    }
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
