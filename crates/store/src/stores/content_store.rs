//! Immutable localized content blocks.

use curio_core::types::DbId;

use crate::models::content::LANGUAGE_ALL;
use crate::models::Content;

pub struct ContentStore {
    contents: Vec<Content>,
}

impl ContentStore {
    pub fn new(contents: Vec<Content>) -> Self {
        Self { contents }
    }

    /// Content for one location in the visitor's language (or the wildcard
    /// "all languages" tag), ordered by `order` ascending.
    pub fn for_location(&self, location_id: DbId, language: DbId) -> Vec<Content> {
        let mut rows: Vec<Content> = self
            .contents
            .iter()
            .filter(|c| {
                c.location_id == location_id
                    && (c.language == language || c.language == LANGUAGE_ALL)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.order);
        rows
    }
}
