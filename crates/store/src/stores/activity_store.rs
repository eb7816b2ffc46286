//! Per-visitor engagement state, keyed by `(visitor, location)`.

use std::collections::HashMap;

use curio_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::Activity;

pub struct ActivityStore {
    activities: RwLock<HashMap<(DbId, DbId), Activity>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self {
            activities: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the activity, creating a locked, un-liked default on first
    /// interaction. Returns the record and whether it was just created.
    pub async fn find_or_create(&self, visitor_id: DbId, location_id: DbId) -> (Activity, bool) {
        let mut map = self.activities.write().await;
        match map.get(&(visitor_id, location_id)) {
            Some(existing) => (existing.clone(), false),
            None => {
                let activity = Activity {
                    visitor_id,
                    location_id,
                    liked: false,
                    locked: true,
                    created_at: chrono::Utc::now(),
                };
                map.insert((visitor_id, location_id), activity.clone());
                (activity, true)
            }
        }
    }

    pub async fn get(&self, visitor_id: DbId, location_id: DbId) -> Option<Activity> {
        self.activities
            .read()
            .await
            .get(&(visitor_id, location_id))
            .cloned()
    }

    /// Unlock, creating the record if needed. Idempotent; returns the
    /// record and whether this call actually flipped the flag.
    pub async fn unlock(&self, visitor_id: DbId, location_id: DbId) -> (Activity, bool) {
        let mut map = self.activities.write().await;
        let activity = map.entry((visitor_id, location_id)).or_insert(Activity {
            visitor_id,
            location_id,
            liked: false,
            locked: true,
            created_at: chrono::Utc::now(),
        });
        let flipped = activity.locked;
        activity.locked = false;
        (activity.clone(), flipped)
    }

    /// Set the liked flag, creating the record if needed.
    pub async fn set_liked(&self, visitor_id: DbId, location_id: DbId, liked: bool) -> Activity {
        let mut map = self.activities.write().await;
        let activity = map.entry((visitor_id, location_id)).or_insert(Activity {
            visitor_id,
            location_id,
            liked: false,
            locked: true,
            created_at: chrono::Utc::now(),
        });
        activity.liked = liked;
        activity.clone()
    }

    /// All of one visitor's activities, keyed by location.
    pub async fn for_visitor(&self, visitor_id: DbId) -> HashMap<DbId, Activity> {
        self.activities
            .read()
            .await
            .values()
            .filter(|a| a.visitor_id == visitor_id)
            .map(|a| (a.location_id, a.clone()))
            .collect()
    }
}

impl Default for ActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let store = ActivityStore::new();

        let (first, created) = store.find_or_create(1, 101).await;
        assert!(created);
        assert!(first.locked);
        assert!(!first.liked);

        let (second, created) = store.find_or_create(1, 101).await;
        assert!(!created);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn unlock_reports_the_transition_only_once() {
        let store = ActivityStore::new();

        let (activity, flipped) = store.unlock(1, 101).await;
        assert!(flipped);
        assert!(!activity.locked);

        let (_, flipped) = store.unlock(1, 101).await;
        assert!(!flipped);
    }

    #[tokio::test]
    async fn visitors_do_not_share_activities() {
        let store = ActivityStore::new();
        store.unlock(1, 101).await;

        assert!(store.get(2, 101).await.is_none());
        let (activity, _) = store.find_or_create(2, 101).await;
        assert!(activity.locked);
    }
}
