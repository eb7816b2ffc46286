//! The location store: atomic read-modify-write per location id.
//!
//! Seat admission is a classic check-then-act hazard: two concurrent
//! arrivals may both observe `current_seat < max_seat` and both increment.
//! [`LocationStore::update`] closes that window by holding a per-id
//! `tokio::sync::Mutex` across the caller's closure. Operations on
//! different ids never block each other; no cross-location atomicity is
//! offered or needed -- a parent/child cascade is two separate atomic
//! steps with a brief observable intermediate state.

use std::collections::HashMap;

use curio_core::error::CoreError;
use curio_core::location::clamp_seat;
use curio_core::types::DbId;
use tokio::sync::Mutex;

use crate::models::Location;

pub struct LocationStore {
    /// The fixed site graph. Keys never change after construction; only the
    /// values behind each mutex do.
    locations: HashMap<DbId, Mutex<Location>>,
    /// Immutable child index, built once from `parent_id` links.
    children: HashMap<DbId, Vec<DbId>>,
    /// All ids in ascending order, for stable listings.
    ordered_ids: Vec<DbId>,
    /// The deployment's single start point.
    start_point: DbId,
}

impl LocationStore {
    /// Build the store from seed data.
    ///
    /// Validates that exactly one location is the start point and that all
    /// parent links resolve; seat counters are clamped into range.
    pub fn new(mut locations: Vec<Location>) -> Result<Self, CoreError> {
        let mut start_points: Vec<DbId> = locations
            .iter()
            .filter(|l| l.is_start_point)
            .map(|l| l.id)
            .collect();
        if start_points.len() != 1 {
            return Err(CoreError::Storage(format!(
                "expected exactly one start point, found {}",
                start_points.len()
            )));
        }
        let start_point = start_points.pop().expect("length checked above");

        let ids: std::collections::HashSet<DbId> = locations.iter().map(|l| l.id).collect();
        if ids.len() != locations.len() {
            return Err(CoreError::Storage("duplicate location id in seed".into()));
        }

        let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for loc in &locations {
            if let Some(parent) = loc.parent_id {
                if !ids.contains(&parent) {
                    return Err(CoreError::Storage(format!(
                        "location {} references missing parent {parent}",
                        loc.id
                    )));
                }
                children.entry(parent).or_default().push(loc.id);
            }
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }

        let mut ordered_ids: Vec<DbId> = locations.iter().map(|l| l.id).collect();
        ordered_ids.sort_unstable();

        for loc in &mut locations {
            loc.current_seat = clamp_seat(loc.current_seat, loc.max_seat);
        }

        Ok(Self {
            locations: locations
                .into_iter()
                .map(|l| (l.id, Mutex::new(l)))
                .collect(),
            children,
            ordered_ids,
            start_point,
        })
    }

    /// Snapshot one location.
    pub async fn get(&self, id: DbId) -> Result<Location, CoreError> {
        match self.locations.get(&id) {
            Some(slot) => Ok(slot.lock().await.clone()),
            None => Err(CoreError::NotFound {
                entity: "location",
                id,
            }),
        }
    }

    /// Atomic read-modify-write on a single location.
    ///
    /// The closure runs while this id's lock is held, so a capacity check
    /// plus increment (or decrement plus status re-derivation) cannot
    /// interleave with another caller on the same id. The seat counter is
    /// clamped after the closure; an out-of-range value is corrected before
    /// it can persist.
    pub async fn update<T>(
        &self,
        id: DbId,
        f: impl FnOnce(&mut Location) -> T,
    ) -> Result<T, CoreError> {
        let slot = self.locations.get(&id).ok_or(CoreError::NotFound {
            entity: "location",
            id,
        })?;
        let mut loc = slot.lock().await;
        let result = f(&mut loc);
        loc.current_seat = clamp_seat(loc.current_seat, loc.max_seat);
        Ok(result)
    }

    /// Ids of the direct children of `id`, ascending. Empty for leaves and
    /// unknown ids.
    pub fn children_of(&self, id: DbId) -> &[DbId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The deployment's start point id.
    pub fn start_point(&self) -> DbId {
        self.start_point
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Snapshot every location, ordered by id ascending.
    pub async fn all_ordered(&self) -> Vec<Location> {
        let mut out = Vec::with_capacity(self.ordered_ids.len());
        for id in &self.ordered_ids {
            if let Some(slot) = self.locations.get(id) {
                out.push(slot.lock().await.clone());
            }
        }
        out
    }

    /// Find the seat-bearing station registered under a kiosk IP address.
    pub async fn find_by_ip(&self, ip: &str) -> Option<Location> {
        for id in &self.ordered_ids {
            let loc = self.locations.get(id)?.lock().await;
            if loc.location_type.is_seat_bearing() && loc.ip_address == ip {
                return Some(loc.clone());
            }
        }
        None
    }

    /// Find the station whose own connection is the given session handle.
    pub async fn find_by_socket(&self, socket_id: &str) -> Option<Location> {
        for id in &self.ordered_ids {
            let loc = self.locations.get(id)?.lock().await;
            if loc.socket_id.as_deref() == Some(socket_id) {
                return Some(loc.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use curio_core::location::{derive_status, LocationStatus, LocationType};

    use super::*;

    fn station(id: DbId, max_seat: i32) -> Location {
        Location {
            id,
            parent_id: None,
            location_type: LocationType::ActiveExhibitAt,
            status: LocationStatus::Free,
            description: format!("station {id}"),
            content_url: Some("tableat".into()),
            ip_address: "0.0.0.0".into(),
            current_seat: 0,
            max_seat,
            is_start_point: id == 1,
            show_in_timeline: false,
            unlock_coa: false,
            start_date: None,
            end_date: None,
            socket_id: None,
            location_tag: None,
        }
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = LocationStore::new(vec![station(1, 4)]).expect("seed");
        let err = store.get(99).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { id: 99, .. });
    }

    #[tokio::test]
    async fn update_clamps_seat_overflow_and_underflow() {
        let store = LocationStore::new(vec![station(1, 4)]).expect("seed");

        store.update(1, |l| l.current_seat = 17).await.expect("update");
        assert_eq!(store.get(1).await.unwrap().current_seat, 4);

        store.update(1, |l| l.current_seat = -3).await.expect("update");
        assert_eq!(store.get(1).await.unwrap().current_seat, 0);
    }

    #[tokio::test]
    async fn exactly_one_start_point_required() {
        let mut a = station(1, 1);
        let mut b = station(2, 1);
        b.is_start_point = true;
        assert!(LocationStore::new(vec![a.clone(), b]).is_err());

        a.is_start_point = false;
        assert!(LocationStore::new(vec![a]).is_err());
    }

    /// Capacity invariant under contention: with 32 concurrent admission
    /// attempts against a 4-seat station, exactly 4 succeed and the final
    /// counter equals the capacity.
    #[tokio::test]
    async fn concurrent_admissions_never_overshoot_capacity() {
        let store = Arc::new(LocationStore::new(vec![station(1, 4)]).expect("seed"));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(1, |loc| {
                        if loc.current_seat < loc.max_seat {
                            loc.current_seat += 1;
                            if let Some(next) =
                                derive_status(loc.current_seat, loc.max_seat, loc.status)
                            {
                                loc.status = next;
                            }
                            true
                        } else {
                            false
                        }
                    })
                    .await
                    .expect("station exists")
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.expect("task") {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 4);
        let loc = store.get(1).await.unwrap();
        assert_eq!(loc.current_seat, 4);
        assert_eq!(loc.status, LocationStatus::Occupied);
    }

    #[tokio::test]
    async fn children_index_is_built_from_parent_links() {
        let mut parent = station(1, 4);
        parent.is_start_point = true;
        let mut on_a = station(11, 1);
        on_a.parent_id = Some(1);
        on_a.is_start_point = false;
        let mut on_b = station(12, 1);
        on_b.parent_id = Some(1);
        on_b.is_start_point = false;

        let store = LocationStore::new(vec![parent, on_b, on_a]).expect("seed");
        assert_eq!(store.children_of(1), &[11, 12]);
        assert!(store.children_of(11).is_empty());
    }
}
