//! Visitor records and DTOs.

use curio_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Full visitor row.
///
/// Contains the password hash -- never serialize this directly. Use
/// [`VisitorProfile`] for anything that leaves the process.
#[derive(Debug, Clone)]
pub struct Visitor {
    pub id: DbId,
    /// Unique display name ("Guest17" for generated guests).
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_guest: bool,
    /// Soft-delete flag; deleted visitors keep their log history.
    pub is_deleted: bool,
    /// The last *admitted* arrival, not every attempted one.
    pub current_location: Option<DbId>,
    /// Live session handle, or `None` while disconnected.
    pub socket_id: Option<String>,
    /// Preferred content language id.
    pub content_language: DbId,
    pub device_address: Option<String>,
    pub device_os: Option<String>,
    pub device_version: Option<String>,
    pub device_model: Option<String>,
    pub answered_questionnaire: bool,
    /// Coat-of-arms color selections.
    pub primary_color: Option<DbId>,
    pub secondary_color: Option<DbId>,
    pub created_at: Timestamp,
}

/// Public visitor representation (no password hash, no device metadata).
/// This is what `visitorJoined` pushes carry to kiosk sessions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorProfile {
    pub id: DbId,
    pub name: String,
    pub is_guest: bool,
    pub current_location: Option<DbId>,
    pub content_language: DbId,
    pub answered_questionnaire: bool,
    pub primary_color: Option<DbId>,
    pub secondary_color: Option<DbId>,
}

impl From<&Visitor> for VisitorProfile {
    fn from(v: &Visitor) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            is_guest: v.is_guest,
            current_location: v.current_location,
            content_language: v.content_language,
            answered_questionnaire: v.answered_questionnaire,
            primary_color: v.primary_color,
            secondary_color: v.secondary_color,
        }
    }
}

/// Input for creating a visitor. The store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewVisitor {
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_guest: bool,
    pub content_language: DbId,
    pub socket_id: Option<String>,
    pub device_address: Option<String>,
    pub device_os: Option<String>,
    pub device_version: Option<String>,
    pub device_model: Option<String>,
}
