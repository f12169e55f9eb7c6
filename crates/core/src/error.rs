use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A delete was refused because trips still reference the entity.
    #[error("In use: {0}")]
    InUse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The one message every authorization denial carries.
    ///
    /// Callers never learn which module, action or region check failed.
    pub fn forbidden() -> Self {
        CoreError::Forbidden("Unauthorized".to_string())
    }
}
