use thiserror::Error;
use uuid::Uuid;

use crate::domain::JobStatus;

/// A single input or output field that does not conform to its declared
/// shape: missing, wrongly typed, out of bounds, or of wrong cardinality.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("schema violation at `{field}`: {message}")]
pub struct SchemaViolation {
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for SchemaViolation {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "input".to_string());
        SchemaViolation::new(field, format!("{errors}"))
    }
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("database error: {0}")]
    Database(String),

    #[error("grading job not found: {0}")]
    NotFound(Uuid),

    #[error("invalid status transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

pub type QueueResult<T> = std::result::Result<T, QueueError>;

#[cfg(feature = "database")]
impl From<sqlx::Error> for QueueError {
    fn from(err: sqlx::Error) -> Self {
        QueueError::Database(err.to_string())
    }
}
