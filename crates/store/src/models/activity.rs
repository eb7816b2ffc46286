use curio_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Per-visitor engagement state for one location.
///
/// Created lazily on first interaction (find-or-create); never deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub visitor_id: DbId,
    pub location_id: DbId,
    pub liked: bool,
    /// Timeline locations start locked and are unlocked progressively.
    pub locked: bool,
    pub created_at: Timestamp,
}
