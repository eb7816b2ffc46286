//! Coat-of-arms catalog (immutable) and per-visitor unlock state.

use std::collections::HashMap;

use curio_core::error::CoreError;
use curio_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::{CoaColor, CoaPart, CoaType, VisitorCoaPart, VisitorPart};

pub struct CoaStore {
    types: Vec<CoaType>,
    parts: Vec<CoaPart>,
    colors: Vec<CoaColor>,
    /// `(visitor, part) -> join record`.
    visitor_parts: RwLock<HashMap<(DbId, DbId), VisitorCoaPart>>,
}

impl CoaStore {
    pub fn new(types: Vec<CoaType>, parts: Vec<CoaPart>, colors: Vec<CoaColor>) -> Self {
        Self {
            types,
            parts,
            colors,
            visitor_parts: RwLock::new(HashMap::new()),
        }
    }

    pub fn parts(&self) -> &[CoaPart] {
        &self.parts
    }

    pub fn colors(&self) -> &[CoaColor] {
        &self.colors
    }

    pub fn types(&self) -> &[CoaType] {
        &self.types
    }

    fn part(&self, part_id: DbId) -> Result<&CoaPart, CoreError> {
        self.parts
            .iter()
            .find(|p| p.id == part_id)
            .ok_or(CoreError::NotFound {
                entity: "coa part",
                id: part_id,
            })
    }

    /// Unlock a part for a visitor (idempotent). `active` marks it as the
    /// current choice within its category without deactivating others; use
    /// [`CoaStore::set_active_part`] for the exclusive swap.
    pub async fn grant(
        &self,
        visitor_id: DbId,
        part_id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        self.part(part_id)?;
        let mut map = self.visitor_parts.write().await;
        map.entry((visitor_id, part_id))
            .or_insert(VisitorCoaPart {
                visitor_id,
                coa_part_id: part_id,
                is_active: active,
            });
        Ok(())
    }

    /// Make `part_id` the visitor's active part within its category,
    /// deactivating every other unlocked part of the same type. The part
    /// must already be unlocked.
    pub async fn set_active_part(&self, visitor_id: DbId, part_id: DbId) -> Result<(), CoreError> {
        let coa_type_id = self.part(part_id)?.coa_type_id;
        let same_type: Vec<DbId> = self
            .parts
            .iter()
            .filter(|p| p.coa_type_id == coa_type_id)
            .map(|p| p.id)
            .collect();

        let mut map = self.visitor_parts.write().await;
        if !map.contains_key(&(visitor_id, part_id)) {
            return Err(CoreError::NotFound {
                entity: "visitor coa part",
                id: part_id,
            });
        }
        for other in same_type {
            if let Some(join) = map.get_mut(&(visitor_id, other)) {
                join.is_active = other == part_id;
            }
        }
        Ok(())
    }

    /// The visitor's unlocked parts with activation flags, ordered by part
    /// id.
    pub async fn parts_for_visitor(&self, visitor_id: DbId) -> Vec<VisitorPart> {
        let map = self.visitor_parts.read().await;
        let mut out: Vec<VisitorPart> = self
            .parts
            .iter()
            .filter_map(|part| {
                map.get(&(visitor_id, part.id)).map(|join| VisitorPart {
                    part: part.clone(),
                    is_active: join.is_active,
                })
            })
            .collect();
        out.sort_by_key(|vp| vp.part.id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CoaStore {
        CoaStore::new(
            vec![
                CoaType {
                    id: 1,
                    description: "shield".into(),
                },
                CoaType {
                    id: 2,
                    description: "symbol".into(),
                },
            ],
            vec![
                CoaPart {
                    id: 10,
                    coa_type_id: 1,
                    name: "Curved Shield".into(),
                    image: "Shield1".into(),
                },
                CoaPart {
                    id: 11,
                    coa_type_id: 1,
                    name: "Rounded Shield".into(),
                    image: "Shield2".into(),
                },
                CoaPart {
                    id: 20,
                    coa_type_id: 2,
                    name: "Eagle".into(),
                    image: "Eagle".into(),
                },
            ],
            vec![],
        )
    }

    #[tokio::test]
    async fn grant_is_idempotent_and_keeps_activation() {
        let store = catalog();
        store.grant(1, 10, true).await.expect("grant");
        store.grant(1, 10, false).await.expect("grant again");

        let parts = store.parts_for_visitor(1).await;
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_active);
    }

    #[tokio::test]
    async fn set_active_part_is_exclusive_within_the_category() {
        let store = catalog();
        store.grant(1, 10, true).await.expect("grant");
        store.grant(1, 11, false).await.expect("grant");
        store.grant(1, 20, true).await.expect("grant");

        store.set_active_part(1, 11).await.expect("swap");

        let parts = store.parts_for_visitor(1).await;
        let active: Vec<DbId> = parts
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.part.id)
            .collect();
        // The shield swapped; the symbol category is untouched.
        assert_eq!(active, vec![11, 20]);
    }

    #[tokio::test]
    async fn activating_a_locked_part_fails() {
        let store = catalog();
        let err = store.set_active_part(1, 10).await.unwrap_err();
        assert_matches::assert_matches!(err, CoreError::NotFound { .. });
    }

    #[tokio::test]
    async fn unknown_part_is_not_found() {
        let store = catalog();
        assert!(store.grant(1, 999, false).await.is_err());
    }
}
