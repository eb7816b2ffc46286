use crate::types::DbId;

/// Domain-level failures shared across the workspace.
///
/// Expected steady-state outcomes (a full station, an unlock precondition
/// that is not met yet, a duplicate arrival) are *not* errors -- they travel
/// as envelope codes (see [`crate::envelope`]). `CoreError` is reserved for
/// the cases the caller genuinely cannot proceed from.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
