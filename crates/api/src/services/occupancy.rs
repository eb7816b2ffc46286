//! The occupancy coordinator: arrival, departure, capacity admission,
//! status derivation, and the kiosk lifecycle.
//!
//! Every operation is a short linear sequence of awaited steps (load,
//! decide, apply, notify). The atomic boundary is always a single
//! `LocationStore::update` call; a parent/child cascade is two such calls,
//! never one combined critical section. Notification is best-effort and
//! happens strictly after the state change it reports.

use curio_core::envelope::{Envelope, CODE_INVALID_REQUEST};
use curio_core::error::CoreError;
use curio_core::location::{derive_status, LocationStatus, LocationType};
use curio_core::types::DbId;
use curio_events::{names, GuideEvent};
use curio_store::models::{Location, VisitorProfile};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::ws::protocol::{PUSH_KICKED_FROM_EXHIBIT, PUSH_OD_LEFT, PUSH_VISITOR_JOINED};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLocationRequest {
    pub user: DbId,
    pub location: DbId,
    /// The visitor saw the exhibit but declined it; activity and log are
    /// updated, no seat admission happens.
    #[serde(default)]
    pub dismissed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLocationData {
    pub location: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    /// Present for an explicit kick; absent for a passive timeout.
    pub user: Option<DbId>,
    pub location: DbId,
    pub parent_location: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDisconnectRequest {
    pub users: Vec<DbId>,
    pub location: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeatRequest {
    pub location: DbId,
    pub parent_location: DbId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitData {
    pub exhibit: Location,
    pub child_locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatusData {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Arrival
// ---------------------------------------------------------------------------

/// Visitor arrival at a location.
///
/// Unlocks the activity, logs the visit, and -- for companion "On"
/// stations -- runs seat admission against the parent "At" station. A full
/// station refuses admission with a `NotModified` envelope and leaves the
/// visitor's `current_location` untouched.
pub async fn register_location(
    state: &AppState,
    req: RegisterLocationRequest,
) -> Envelope<RegisterLocationData> {
    let visitor = match state.store.visitors.get(req.user).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    let location = match state.store.locations.get(req.location).await {
        Ok(l) => l,
        Err(e) => return e.into(),
    };

    // First interaction with a location unlocks it; repeat arrivals are
    // idempotent.
    state
        .store
        .activities
        .unlock(visitor.id, location.id)
        .await;

    let log_event = if req.dismissed {
        names::LOCATION_DISMISSED
    } else {
        names::LOCATION_VISITED
    };
    state.bus.publish(
        GuideEvent::new(log_event)
            .at_location(location.id)
            .by_visitor(visitor.id),
    );

    let data = RegisterLocationData {
        location: location.id,
    };

    if req.dismissed {
        return Envelope::ok(data, "Location registered");
    }

    // Re-admitting the current location would double-count a seat.
    if visitor.current_location == Some(location.id) {
        return Envelope::not_modified("Location is already registered");
    }

    if !location.location_type.is_companion() {
        if let Err(e) = state
            .store
            .visitors
            .update(visitor.id, |v| v.current_location = Some(location.id))
            .await
        {
            return e.into();
        }
        return Envelope::ok(data, "Location registered");
    }

    // Companion station: one seat is borrowed from the parent "At" station.
    let Some(parent_id) = location.parent_id else {
        tracing::warn!(location_id = location.id, "Companion station has no parent");
        return Envelope::failure(CODE_INVALID_REQUEST, "Companion station has no parent");
    };

    let admitted = match state
        .store
        .locations
        .update(parent_id, |parent| {
            if parent.has_open_seat() {
                parent.current_seat += 1;
                if let Some(next) =
                    derive_status(parent.current_seat, parent.max_seat, parent.status)
                {
                    parent.status = next;
                }
                true
            } else {
                false
            }
        })
        .await
    {
        Ok(admitted) => admitted,
        Err(e) => return e.into(),
    };

    if !admitted {
        tracing::debug!(
            visitor_id = visitor.id,
            location_id = location.id,
            parent_id,
            "Admission refused, station full or not free"
        );
        return Envelope::not_modified("Exhibit is at capacity");
    }

    if let Err(e) = state
        .store
        .visitors
        .update(visitor.id, |v| v.current_location = Some(location.id))
        .await
    {
        return e.into();
    }

    // These companion kinds mark their own station busy, distinct from the
    // parent's seat count.
    if location.location_type.marks_own_status() {
        let _ = state
            .store
            .locations
            .update(location.id, |l| l.status = LocationStatus::Occupied)
            .await;
    }

    // The notify kiosk wants to greet the arriving visitor on its screen.
    if location.location_type == LocationType::NotifyExhibitOn {
        if let Ok(parent) = state.store.locations.get(parent_id).await {
            if let Some(socket) = parent.socket_id {
                let mut profile = VisitorProfile::from(&visitor);
                profile.current_location = Some(location.id);
                state
                    .sessions
                    .send_to_session(&socket, PUSH_VISITOR_JOINED, &profile)
                    .await;
            }
        }
    }

    Envelope::ok(data, "Location registered")
}

// ---------------------------------------------------------------------------
// Departure
// ---------------------------------------------------------------------------

/// Visitor departure from a companion station.
///
/// An already-free station is a legitimate no-op, not an error. Several
/// visitors can share one companion, so the parent's seat counter is the
/// ground truth for "somebody is still seated here"; the companion's own
/// status only says whether anyone is present at all. The parent seat
/// decrement is clamped at zero; repeated departures can never drive the
/// counter negative.
pub async fn disconnect_from_exhibit(state: &AppState, req: DisconnectRequest) -> Envelope<()> {
    let own = match state.store.locations.get(req.location).await {
        Ok(l) => l,
        Err(e) => return e.into(),
    };
    let parent_before = match state.store.locations.get(req.parent_location).await {
        Ok(l) => l,
        Err(e) => return e.into(),
    };
    if parent_before.current_seat == 0 && own.status != LocationStatus::Occupied {
        return Envelope::not_modified("Location is already free");
    }

    if let Err(e) = state
        .store
        .locations
        .update(req.location, |l| l.status = LocationStatus::Free)
        .await
    {
        return e.into();
    }

    let parent = match release_parent_seat(state, req.parent_location).await {
        Ok(p) => p,
        Err(e) => return e.into(),
    };

    if parent.location_type == LocationType::NotifyExhibitAt {
        if let Some(socket) = &parent.socket_id {
            state
                .sessions
                .send_to_session(
                    socket,
                    PUSH_OD_LEFT,
                    &serde_json::json!({ "location": req.location, "user": req.user }),
                )
                .await;
        }
    }

    // An explicit kick tells the visitor's own session; a passive timeout
    // has nobody left to tell.
    if let Some(visitor_id) = req.user {
        state
            .sessions
            .send_to_visitor(
                visitor_id,
                PUSH_KICKED_FROM_EXHIBIT,
                &serde_json::json!({ "parent": req.parent_location }),
            )
            .await;
    }

    Envelope::updated((), "Disconnected from exhibit")
}

/// Decrement the parent's seat counter (floored at zero), re-derive its
/// status, and return the post-change snapshot.
async fn release_parent_seat(state: &AppState, parent_id: DbId) -> Result<Location, CoreError> {
    state
        .store
        .locations
        .update(parent_id, |parent| {
            parent.current_seat = (parent.current_seat - 1).max(0);
            if let Some(next) = derive_status(parent.current_seat, parent.max_seat, parent.status)
            {
                parent.status = next;
            }
            parent.clone()
        })
        .await
}

/// Bulk eviction when a shared physical station is reset.
///
/// Each seated visitor releases exactly one parent seat. Departures are
/// independent atomic steps; one failing departure never blocks the
/// others. Fire-and-forget: no result frame.
pub async fn table_disconnect_from_exhibit(state: &AppState, req: TableDisconnectRequest) {
    for visitor_id in req.users {
        let Ok(visitor) = state.store.visitors.get(visitor_id).await else {
            tracing::warn!(visitor_id, "Table reset references unknown visitor");
            continue;
        };
        let Some(current) = visitor.current_location else {
            continue;
        };
        let Ok(current_loc) = state.store.locations.get(current).await else {
            continue;
        };

        // Only visitors actually seated at this table are evicted.
        let at_table =
            current == req.location || current_loc.parent_id == Some(req.location);
        if !at_table || !current_loc.location_type.is_companion() {
            continue;
        }
        let Some(parent_id) = current_loc.parent_id else {
            continue;
        };

        let result = disconnect_from_exhibit(
            state,
            DisconnectRequest {
                user: Some(visitor_id),
                location: current,
                parent_location: parent_id,
            },
        )
        .await;
        if !result.message.is_success() {
            tracing::debug!(
                visitor_id,
                location_id = current,
                code = result.message.code,
                "Table reset departure was a no-op"
            );
        }
    }
}

/// Reset a visitor whose live connection dropped.
///
/// Frees the visitor's seat if their last admitted location was a companion
/// station, then points them back at the start point. Behavior companions
/// never show `Occupied`, so the departure decides on the parent's seat
/// counter, not the companion status.
pub async fn reset_user_location(state: &AppState, visitor_id: DbId) -> Result<(), CoreError> {
    let visitor = state.store.visitors.get(visitor_id).await?;

    if let Some(current) = visitor.current_location {
        if let Ok(loc) = state.store.locations.get(current).await {
            if loc.location_type.is_companion() {
                let _ = disconnect_from_exhibit(
                    state,
                    DisconnectRequest {
                        user: None,
                        location: current,
                        parent_location: loc.parent_id.unwrap_or(current),
                    },
                )
                .await;
            }
        }
    }

    let start = state.store.locations.start_point();
    state
        .store
        .visitors
        .update(visitor_id, |v| {
            v.current_location = Some(start);
            v.socket_id = None;
        })
        .await?;

    tracing::debug!(visitor_id, "Visitor reset to start point");
    Ok(())
}

// ---------------------------------------------------------------------------
// Kiosk lifecycle and administrative corrections
// ---------------------------------------------------------------------------

/// Administrative seat correction fired by a kiosk. Fire-and-forget.
pub async fn update_location_seat(state: &AppState, req: UpdateSeatRequest) {
    if let Err(e) = state
        .store
        .locations
        .update(req.location, |l| l.status = LocationStatus::Free)
        .await
    {
        tracing::warn!(location_id = req.location, error = %e, "Seat correction on unknown location");
        return;
    }
    if let Err(e) = release_parent_seat(state, req.parent_location).await {
        tracing::warn!(parent_id = req.parent_location, error = %e, "Seat correction on unknown parent");
    }
}

/// Kiosk registration: bind the station's session handle and reset the
/// station and its companions to `Free` with empty seats.
pub async fn login_exhibit(state: &AppState, session_id: &str, ip_address: &str) -> Envelope<ExhibitData> {
    let Some(exhibit) = state.store.locations.find_by_ip(ip_address).await else {
        return Envelope::failure(
            curio_core::envelope::CODE_NOT_FOUND,
            "Could not find location",
        );
    };

    let session = session_id.to_owned();
    let exhibit = match state
        .store
        .locations
        .update(exhibit.id, move |l| {
            l.socket_id = Some(session);
            l.status = LocationStatus::Free;
            l.current_seat = 0;
            l.clone()
        })
        .await
    {
        Ok(l) => l,
        Err(e) => return e.into(),
    };

    let mut child_locations = Vec::new();
    for &child in state.store.locations.children_of(exhibit.id) {
        match state
            .store
            .locations
            .update(child, |l| {
                l.status = LocationStatus::Free;
                l.current_seat = 0;
                l.clone()
            })
            .await
        {
            Ok(l) => child_locations.push(l),
            Err(e) => tracing::warn!(location_id = child, error = %e, "Missing child on exhibit login"),
        }
    }

    tracing::info!(exhibit_id = exhibit.id, ip_address, "Exhibit logged in");
    Envelope::ok(
        ExhibitData {
            exhibit,
            child_locations,
        },
        "location data found",
    )
}

/// A kiosk's connection dropped: take its station and companions offline.
pub async fn shutdown_exhibit(state: &AppState, session_id: &str) {
    let Some(exhibit) = state.store.locations.find_by_socket(session_id).await else {
        return;
    };

    let offline = |l: &mut Location| {
        l.status = LocationStatus::Offline;
        l.current_seat = 0;
    };

    let _ = state
        .store
        .locations
        .update(exhibit.id, |l| {
            offline(l);
            l.socket_id = None;
        })
        .await;
    for &child in state.store.locations.children_of(exhibit.id) {
        let _ = state.store.locations.update(child, offline).await;
    }

    tracing::info!(exhibit_id = exhibit.id, "Exhibit shut down");
}

/// Status poll for a kiosk-adjacent client.
pub async fn check_location_status(state: &AppState, location_id: DbId) -> Envelope<LocationStatusData> {
    let status = match state.store.locations.get(location_id).await {
        Err(_) => "NOT FOUND",
        Ok(loc) if !loc.location_type.is_seat_bearing() => "NOT ACTIVE EXHIBIT",
        Ok(loc) if loc.has_open_seat() => "FREE",
        Ok(_) => "OCCUPIED",
    };
    Envelope::ok(LocationStatusData { status }, "Location status checked")
}
