use curio_core::types::DbId;
use serde::Serialize;

/// Text content kind.
pub const CONTENT_TYPE_TEXT: i32 = 1;
/// Image URL content kind.
pub const CONTENT_TYPE_IMAGE: i32 = 2;

/// English content language id.
pub const LANGUAGE_ENG: DbId = 1;
/// German content language id.
pub const LANGUAGE_GER: DbId = 2;
/// Wildcard: content shown regardless of the visitor's language.
pub const LANGUAGE_ALL: DbId = 3;

/// A localized content block attached to a location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub location_id: DbId,
    pub content: String,
    /// Display order within the location, ascending.
    pub order: i32,
    pub content_type: i32,
    pub language: DbId,
    pub year: Option<i32>,
}
