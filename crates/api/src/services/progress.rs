//! The progress tracker: sequential timeline unlocks and the per-visitor
//! lookup table.

use std::collections::HashMap;

use curio_core::envelope::Envelope;
use curio_core::location::section_id_for;
use curio_core::types::DbId;
use curio_events::{names, GuideEvent};
use curio_store::models::{Activity, Content, Location, Visitor};
use curio_store::seed::SECTION_OPENERS;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineUpdateRequest {
    pub user: DbId,
    pub location: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLikeRequest {
    pub user: DbId,
    pub location: DbId,
    pub like: bool,
}

/// A location annotated with one visitor's engagement state and the
/// content rows matching their language.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupLocation {
    #[serde(flatten)]
    pub location: Location,
    pub liked: bool,
    pub locked: bool,
    pub content: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupData {
    pub locations: Vec<LookupLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeData {
    pub location: DbId,
    pub liked: bool,
}

/// Sequential timeline unlock.
///
/// A location unlocks immediately when nothing points at it in the
/// timeline or when it is a section opener; otherwise its predecessor must
/// already be unlocked. Section openers additionally unlock the synthetic
/// section activity derived from the id's leading digit.
pub async fn register_timeline_update(
    state: &AppState,
    req: TimelineUpdateRequest,
) -> Envelope<LookupData> {
    let visitor = match state.store.visitors.get(req.user).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    if !state.store.locations.contains(req.location) {
        return curio_core::error::CoreError::NotFound {
            entity: "location",
            id: req.location,
        }
        .into();
    }

    let is_opener = SECTION_OPENERS.contains(&req.location);
    let gate = if is_opener {
        None
    } else {
        state.store.neighbors.previous_of(req.location)
    };

    if let Some(previous) = gate {
        let previous_unlocked = state
            .store
            .activities
            .get(visitor.id, previous)
            .await
            .map(|a| !a.locked)
            .unwrap_or(false);

        if !previous_unlocked {
            state.bus.publish(
                GuideEvent::new(names::TIMELINE_ALREADY_SEEN)
                    .at_location(req.location)
                    .by_visitor(visitor.id),
            );
            return Envelope::not_modified("Previous timeline location is still locked");
        }
    }

    let (_, flipped) = state.store.activities.unlock(visitor.id, req.location).await;
    if is_opener {
        state
            .store
            .activities
            .unlock(visitor.id, section_id_for(req.location))
            .await;
    }

    let log_event = if flipped {
        names::TIMELINE_UNLOCKED
    } else {
        names::TIMELINE_ALREADY_SEEN
    };
    state.bus.publish(
        GuideEvent::new(log_event)
            .at_location(req.location)
            .by_visitor(visitor.id),
    );

    let data = LookupData {
        locations: lookup_table(state, &visitor).await,
    };
    if flipped {
        Envelope::updated(data, "Timeline location unlocked")
    } else {
        Envelope::ok(data, "Timeline location was already unlocked")
    }
}

/// Read-only projection of every location with the visitor's flags.
///
/// Safe to call concurrently with any coordinator operation; it only takes
/// per-location snapshots.
pub async fn get_lookup_table(state: &AppState, visitor_id: DbId) -> Envelope<LookupData> {
    let visitor = match state.store.visitors.get(visitor_id).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    Envelope::ok(
        LookupData {
            locations: lookup_table(state, &visitor).await,
        },
        "Lookup table found",
    )
}

/// Curator/demo reset: unlock every timeline location for the visitor.
pub async fn unlock_all_timeline_locations(state: &AppState, visitor_id: DbId) -> Envelope<LookupData> {
    let visitor = match state.store.visitors.get(visitor_id).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };

    for location in state.store.locations.all_ordered().await {
        if location.show_in_timeline {
            state.store.activities.unlock(visitor.id, location.id).await;
        }
    }

    Envelope::updated(
        LookupData {
            locations: lookup_table(state, &visitor).await,
        },
        "All timeline locations unlocked",
    )
}

/// Toggle the liked flag on a visitor's activity (find-or-create).
pub async fn update_location_like(state: &AppState, req: LocationLikeRequest) -> Envelope<LikeData> {
    if let Err(e) = state.store.visitors.get(req.user).await {
        return e.into();
    }
    if !state.store.locations.contains(req.location) {
        return curio_core::error::CoreError::NotFound {
            entity: "location",
            id: req.location,
        }
        .into();
    }

    let activity = state
        .store
        .activities
        .set_liked(req.user, req.location, req.like)
        .await;
    Envelope::updated(
        LikeData {
            location: activity.location_id,
            liked: activity.liked,
        },
        "Like updated",
    )
}

/// Build the annotated location list: every location, the visitor's
/// `liked`/`locked` flags (defaulting to un-liked and locked), and content
/// in the visitor's language or the wildcard.
pub async fn lookup_table(state: &AppState, visitor: &Visitor) -> Vec<LookupLocation> {
    let activities: HashMap<DbId, Activity> =
        state.store.activities.for_visitor(visitor.id).await;

    state
        .store
        .locations
        .all_ordered()
        .await
        .into_iter()
        .map(|location| {
            let (liked, locked) = activities
                .get(&location.id)
                .map(|a| (a.liked, a.locked))
                .unwrap_or((false, true));
            let content = state
                .store
                .contents
                .for_location(location.id, visitor.content_language);
            LookupLocation {
                location,
                liked,
                locked,
                content,
            }
        })
        .collect()
}
