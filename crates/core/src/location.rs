//! Location vocabulary and the pure parts of the occupancy state machine.
//!
//! Seat admission itself needs the store's per-id serialization and lives in
//! the coordinator; everything here is a pure function of its arguments so
//! it can be exhaustively unit-tested.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Closed catalog of location kinds.
///
/// The "-At" kinds are seat-bearing stations; the "-On" kinds are their
/// interactive companions, linked via `parent_id` to the "-At" station they
/// belong to. Integer codes are stable and match the seeded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationType {
    Room,
    ActiveExhibitOn,
    ActiveExhibitAt,
    PassiveExhibit,
    Door,
    ActiveExhibitBehaviorAt,
    ActiveExhibitBehaviorOn,
    InteractiveExhibit,
    NotifyExhibitAt,
    NotifyExhibitOn,
}

impl LocationType {
    pub fn code(self) -> i32 {
        match self {
            LocationType::Room => 1,
            LocationType::ActiveExhibitOn => 2,
            LocationType::ActiveExhibitAt => 3,
            LocationType::PassiveExhibit => 4,
            LocationType::Door => 5,
            LocationType::ActiveExhibitBehaviorAt => 6,
            LocationType::ActiveExhibitBehaviorOn => 7,
            LocationType::InteractiveExhibit => 8,
            LocationType::NotifyExhibitAt => 9,
            LocationType::NotifyExhibitOn => 10,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => LocationType::Room,
            2 => LocationType::ActiveExhibitOn,
            3 => LocationType::ActiveExhibitAt,
            4 => LocationType::PassiveExhibit,
            5 => LocationType::Door,
            6 => LocationType::ActiveExhibitBehaviorAt,
            7 => LocationType::ActiveExhibitBehaviorOn,
            8 => LocationType::InteractiveExhibit,
            9 => LocationType::NotifyExhibitAt,
            10 => LocationType::NotifyExhibitOn,
            _ => return None,
        })
    }

    /// Seat-bearing "At" stations. Only these participate in seat accounting.
    pub fn is_seat_bearing(self) -> bool {
        matches!(
            self,
            LocationType::ActiveExhibitAt
                | LocationType::ActiveExhibitBehaviorAt
                | LocationType::NotifyExhibitAt
        )
    }

    /// Companion "On" sub-stations. They borrow a seat from their parent
    /// "At" station and never hold seats themselves.
    pub fn is_companion(self) -> bool {
        matches!(
            self,
            LocationType::ActiveExhibitOn
                | LocationType::ActiveExhibitBehaviorOn
                | LocationType::NotifyExhibitOn
        )
    }

    /// Companion kinds that mark their own station `Occupied` on admission,
    /// distinct from the parent's seat count.
    pub fn marks_own_status(self) -> bool {
        matches!(
            self,
            LocationType::ActiveExhibitOn | LocationType::NotifyExhibitOn
        )
    }
}

/// Runtime status of a location.
///
/// `Free`/`Occupied` are derived from the seat counters of "At" stations;
/// `Offline` is an administrative override set when the physical station
/// disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationStatus {
    Online,
    Offline,
    Free,
    Occupied,
}

impl LocationStatus {
    pub fn code(self) -> i32 {
        match self {
            LocationStatus::Online => 1,
            LocationStatus::Offline => 2,
            LocationStatus::Free => 3,
            LocationStatus::Occupied => 4,
        }
    }
}

/// Re-derive an "At" station's status after a seat change.
///
/// The transition table is exhaustive and must not grow implicit cases:
/// below capacity while `Occupied` flips to `Free`, at/over capacity while
/// `Free` flips to `Occupied`, everything else (including `Online` and
/// `Offline`) is left alone. Returns `None` when no transition applies.
pub fn derive_status(
    current_seat: i32,
    max_seat: i32,
    status: LocationStatus,
) -> Option<LocationStatus> {
    if current_seat < max_seat && status == LocationStatus::Occupied {
        Some(LocationStatus::Free)
    } else if current_seat >= max_seat && status == LocationStatus::Free {
        Some(LocationStatus::Occupied)
    } else {
        None
    }
}

/// Clamp a seat counter into `0..=max_seat`. Violations are corrected,
/// never persisted.
pub fn clamp_seat(seat: i32, max_seat: i32) -> i32 {
    seat.clamp(0, max_seat.max(0))
}

/// Synthetic section activity id for a section-opening location: the id's
/// leading digit scaled by 1000 (`5021` opens section `5000`).
pub fn section_id_for(location_id: DbId) -> DbId {
    let mut leading = location_id.abs();
    while leading >= 10 {
        leading /= 10;
    }
    leading * 1000
}
