use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A natural key (email, vehicle tag/serial, service name) is already taken.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The operation is blocked by existing dependent rows.
    #[error("Conflict: {message}")]
    Conflict { message: String, count: i64 },

    #[error("No updates were made")]
    NoOpUpdate,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
