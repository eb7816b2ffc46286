//! The immutable timeline edge list.

use curio_core::types::DbId;

use crate::models::Neighbor;

pub struct NeighborStore {
    edges: Vec<Neighbor>,
}

impl NeighborStore {
    pub fn new(edges: Vec<Neighbor>) -> Self {
        Self { edges }
    }

    /// The timeline predecessor of `next`, if any edge points at it.
    pub fn previous_of(&self, next: DbId) -> Option<DbId> {
        self.edges
            .iter()
            .find(|e| e.next == next)
            .map(|e| e.previous)
    }

    /// Whether any edge points at `next`. Locations without an incoming
    /// edge unlock unconditionally.
    pub fn has_incoming(&self, next: DbId) -> bool {
        self.previous_of(next).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_lookup_follows_the_edge_direction() {
        let store = NeighborStore::new(vec![
            Neighbor {
                previous: 1000,
                next: 101,
            },
            Neighbor {
                previous: 101,
                next: 102,
            },
        ]);

        assert_eq!(store.previous_of(101), Some(1000));
        assert_eq!(store.previous_of(102), Some(101));
        assert_eq!(store.previous_of(1000), None);
        assert!(store.has_incoming(101));
        assert!(!store.has_incoming(1000));
    }
}
