//! In-memory record stores for the guide backend.
//!
//! The site graph is small, fixed, and known at deploy time, so the whole
//! data set lives in process memory, seeded once at startup by [`seed`].
//! The one part with real correctness requirements is
//! [`stores::LocationStore`]: it serializes read-modify-write sequences per
//! location id so concurrent seat admissions cannot overshoot capacity.
//!
//! Swapping this crate for a transactional storage backend would not change
//! the coordinator algorithms; per-id serialization is the only contract.

pub mod models;
pub mod seed;
pub mod stores;

use curio_core::error::CoreError;

use crate::stores::{
    ActivityStore, CoaStore, ContentStore, LocationStore, LogStore, NeighborStore, SettingsStore,
    VisitorStore,
};

/// Aggregate of all record stores. Constructed once at startup and shared
/// via `Arc<Store>`.
pub struct Store {
    pub locations: LocationStore,
    pub visitors: VisitorStore,
    pub activities: ActivityStore,
    pub neighbors: NeighborStore,
    pub contents: ContentStore,
    pub coa: CoaStore,
    pub logs: LogStore,
    pub settings: SettingsStore,
}

impl Store {
    /// Build a store populated with the deployment's seed data.
    pub fn seeded() -> Result<Self, CoreError> {
        Ok(Self {
            locations: LocationStore::new(seed::locations())?,
            visitors: VisitorStore::new(),
            activities: ActivityStore::new(),
            neighbors: NeighborStore::new(seed::neighbors()),
            contents: ContentStore::new(seed::contents()),
            coa: CoaStore::new(seed::coa_types(), seed::coa_parts(), seed::coa_colors()),
            logs: LogStore::new(),
            settings: SettingsStore::new(seed::settings()),
        })
    }
}
