//! Location records: nodes of the fixed parent/child site forest.

use curio_core::location::{LocationStatus, LocationType};
use curio_core::types::DbId;
use serde::Serialize;

/// A node in the site graph.
///
/// Created once at seed time; `status`, `current_seat`, and `socket_id` are
/// mutated continuously at runtime, everything else is immutable deployment
/// data. Never deleted during normal operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Stable id assigned at deploy/seed time, not auto-generated.
    pub id: DbId,
    /// Parent node; `None` for roots.
    pub parent_id: Option<DbId>,
    pub location_type: LocationType,
    pub status: LocationStatus,
    pub description: String,
    /// Client-side content route for the station ("tableat", "passive", ...).
    pub content_url: Option<String>,
    /// Kiosk station address; used by exhibit login to find the record.
    pub ip_address: String,
    /// Seats currently taken. Only meaningful for "At" stations.
    pub current_seat: i32,
    /// Seat capacity, at least 1 for seat-bearing stations.
    pub max_seat: i32,
    /// Exactly one location per deployment holds this.
    pub is_start_point: bool,
    pub show_in_timeline: bool,
    /// Reaching this location awards a coat-of-arms part.
    pub unlock_coa: bool,
    pub start_date: Option<i32>,
    pub end_date: Option<i32>,
    /// Session handle of the station's own live connection (kiosks only).
    #[serde(skip_serializing)]
    pub socket_id: Option<String>,
    pub location_tag: Option<String>,
}

impl Location {
    /// Whether another visitor can currently be admitted to this "At"
    /// station: status says free and a seat is open.
    pub fn has_open_seat(&self) -> bool {
        self.status == LocationStatus::Free && self.current_seat < self.max_seat
    }
}
