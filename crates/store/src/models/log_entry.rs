use curio_core::types::{DbId, Timestamp};
use serde::Serialize;

/// One analytics log line.
///
/// `log_type` carries the raw integer code (see `curio_core::log_types`);
/// client-defined codes pass through unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub visitor_id: DbId,
    pub log_type: i32,
    pub location_id: Option<DbId>,
    pub comment: Option<String>,
    pub timestamp: Timestamp,
}
