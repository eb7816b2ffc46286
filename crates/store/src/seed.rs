//! Deployment seed data: the fixed site graph and catalogs.
//!
//! The exhibition is organized as one root room with six themed sections.
//! Each section has an intro door shown in the timeline; sections contain
//! passive exhibits, multi-seat active tables ("At" stations with their
//! interactive "On" companions), and one notify kiosk. Ids are stable and
//! shared with the client apps -- do not renumber.

use curio_core::location::{LocationStatus, LocationType};
use curio_core::types::DbId;

use crate::models::content::{CONTENT_TYPE_TEXT, LANGUAGE_ALL, LANGUAGE_ENG, LANGUAGE_GER};
use crate::models::{CoaColor, CoaPart, CoaType, Content, Location, Neighbor, Settings};

/// Section-opening locations: reaching one of these unlocks the synthetic
/// section activity derived from the id's leading digit (`5021` -> `5000`).
pub const SECTION_OPENERS: &[DbId] = &[3011, 4031, 5021, 5022];

fn location(id: DbId, location_type: LocationType, status: LocationStatus) -> Location {
    Location {
        id,
        parent_id: None,
        location_type,
        status,
        description: String::new(),
        content_url: None,
        ip_address: "0.0.0.0".into(),
        current_seat: 0,
        max_seat: 1,
        is_start_point: false,
        show_in_timeline: false,
        unlock_coa: false,
        start_date: None,
        end_date: None,
        socket_id: None,
        location_tag: None,
    }
}

fn room(id: DbId, parent: Option<DbId>, description: &str) -> Location {
    Location {
        parent_id: parent,
        description: description.into(),
        ..location(id, LocationType::Room, LocationStatus::Online)
    }
}

fn door(id: DbId, parent: DbId, description: &str, start: i32, end: i32) -> Location {
    Location {
        parent_id: Some(parent),
        description: description.into(),
        show_in_timeline: true,
        start_date: Some(start),
        end_date: Some(end),
        ..location(id, LocationType::Door, LocationStatus::Online)
    }
}

fn passive(id: DbId, parent: DbId, start: i32, end: i32) -> Location {
    Location {
        parent_id: Some(parent),
        description: "passive exhibit".into(),
        content_url: Some("passive".into()),
        show_in_timeline: true,
        start_date: Some(start),
        end_date: Some(end),
        ..location(id, LocationType::PassiveExhibit, LocationStatus::Online)
    }
}

fn at_station(
    id: DbId,
    parent: DbId,
    location_type: LocationType,
    ip: &str,
    max_seat: i32,
    start: i32,
    end: i32,
) -> Location {
    Location {
        parent_id: Some(parent),
        description: "active exhibit".into(),
        content_url: Some("tableat".into()),
        ip_address: ip.into(),
        max_seat,
        show_in_timeline: true,
        start_date: Some(start),
        end_date: Some(end),
        ..location(id, location_type, LocationStatus::Offline)
    }
}

fn on_station(id: DbId, parent: DbId, location_type: LocationType) -> Location {
    Location {
        parent_id: Some(parent),
        description: "companion station".into(),
        content_url: Some("tableon".into()),
        ..location(id, location_type, LocationStatus::Offline)
    }
}

/// The full site graph. Stations start `Offline` until their kiosk logs in.
pub fn locations() -> Vec<Location> {
    let mut root = room(1, None, "Klosterneuburg");
    root.is_start_point = true;

    let mut list = vec![
        root,
        room(10, Some(1), "Section (10): introduction"),
        room(20, Some(1), "Section (20): canonization and conflicts"),
        room(30, Some(1), "Section (30): maximilian"),
        room(40, Some(1), "Section (40): Klosterneuburg legend"),
        room(50, Some(1), "Section (50): translation"),
        room(60, Some(1), "Section (60): death"),
        // Section intro doors, one per section, all on the timeline.
        door(1000, 10, "Intro to section 1", 1450, 1499),
        door(2000, 20, "Intro to section 2", 1450, 1507),
        door(3000, 30, "Intro to section 3", 1459, 1577),
        door(4000, 40, "Intro to section 4", 1485, 1505),
        door(5000, 50, "Intro to section 5", 1506, 1507),
        // Passive exhibits.
        passive(2001, 20, 1450, 1493),
        passive(2002, 20, 1468, 1470),
        passive(2003, 20, 1470, 1490),
        passive(2004, 20, 1507, 1508),
        passive(4001, 40, 1485, 1486),
        passive(4004, 40, 1505, 1506),
        // Active exhibit tables (seat-bearing).
        at_station(101, 10, LocationType::ActiveExhibitAt, "10.0.1.101", 4, 1450, 1499),
        at_station(102, 10, LocationType::ActiveExhibitAt, "10.0.1.102", 4, 1450, 1499),
        at_station(402, 40, LocationType::ActiveExhibitAt, "10.0.4.102", 4, 1491, 1492),
        at_station(501, 50, LocationType::ActiveExhibitAt, "10.0.5.101", 4, 1506, 1507),
        // Behavior tables with their On companions.
        at_station(301, 30, LocationType::ActiveExhibitBehaviorAt, "10.0.3.101", 15, 1459, 1577),
        on_station(3011, 301, LocationType::ActiveExhibitBehaviorOn),
        at_station(403, 40, LocationType::ActiveExhibitBehaviorAt, "10.0.4.103", 15, 1491, 1505),
        on_station(4031, 403, LocationType::ActiveExhibitBehaviorOn),
        at_station(502, 50, LocationType::ActiveExhibitBehaviorAt, "10.0.5.102", 15, 1506, 1507),
        on_station(5021, 502, LocationType::ActiveExhibitBehaviorOn),
        on_station(5022, 502, LocationType::ActiveExhibitBehaviorOn),
        // The death-mask kiosk notifies its own screen about arrivals.
        at_station(601, 60, LocationType::NotifyExhibitAt, "10.0.6.101", 2, 1519, 1520),
        on_station(6011, 601, LocationType::NotifyExhibitOn),
    ];

    // Sections 4/5/6 and the door into section 6 award coat-of-arms parts.
    for loc in &mut list {
        if matches!(loc.id, 402 | 403 | 501 | 502 | 601) {
            loc.unlock_coa = true;
        }
    }

    list
}

/// Canonical timeline traversal order.
pub fn neighbors() -> Vec<Neighbor> {
    vec![
        Neighbor {
            previous: 1000,
            next: 101,
        },
        Neighbor {
            previous: 101,
            next: 102,
        },
        Neighbor {
            previous: 102,
            next: 2000,
        },
    ]
}

fn text(location_id: DbId, order: i32, language: DbId, body: &str) -> Content {
    Content {
        location_id,
        content: body.into(),
        order,
        content_type: CONTENT_TYPE_TEXT,
        language,
        year: None,
    }
}

pub fn contents() -> Vec<Content> {
    vec![
        text(1000, 1, LANGUAGE_GER, "Willkommen in der Ausstellung!"),
        text(1000, 1, LANGUAGE_ENG, "Welcome to the exhibition!"),
        text(101, 1, LANGUAGE_GER, "Willkommen beim Quiz!"),
        text(101, 1, LANGUAGE_ENG, "Welcome to the quiz!"),
        Content {
            content_type: CONTENT_TYPE_TEXT,
            ..text(101, 2, LANGUAGE_ALL, "https://static.example.org/quiz-intro.png")
        },
        text(2001, 1, LANGUAGE_GER, "Willkommen beim passiven Exponat!"),
        text(2001, 1, LANGUAGE_ENG, "Welcome at the passive exhibit!"),
    ]
}

pub fn coa_types() -> Vec<CoaType> {
    let descriptions = [
        (1, "shield"),
        (2, "symbol"),
        (3, "helmet"),
        (4, "mantling"),
    ];
    descriptions
        .into_iter()
        .map(|(id, description)| CoaType {
            id,
            description: description.into(),
        })
        .collect()
}

pub fn coa_parts() -> Vec<CoaPart> {
    let parts: [(DbId, DbId, &str, &str); 18] = [
        (10, 1, "Curved Shield", "Shield1"),
        (11, 1, "Rounded Shield", "Shield2"),
        (12, 1, "Ornamental Shield", "Shield3"),
        (13, 1, "Classic Shield", "Shield4"),
        (20, 2, "Eagle", "Eagle"),
        (21, 2, "Lion", "Lion"),
        (22, 2, "Dragon", "Dragon"),
        (23, 2, "Horse", "Horse"),
        (24, 2, "Gryphon", "Gryphon"),
        (25, 2, "Unicorn", "Unicorn"),
        (30, 3, "Side-facing knight helmet", "Helmet1"),
        (31, 3, "Front-facing helmet", "Helmet2"),
        (32, 3, "Decorated helmet", "Helmet2+"),
        (33, 3, "Crowned helmet", "Helmet2++"),
        (40, 4, "Crossed swords", "Mantle1"),
        (41, 4, "Crossed axes", "Mantle2"),
        (42, 4, "Ornamental mantling", "Mantle3"),
        (43, 4, "Wings", "Mantle4"),
    ];
    parts
        .into_iter()
        .map(|(id, coa_type_id, name, image)| CoaPart {
            id,
            coa_type_id,
            name: name.into(),
            image: image.into(),
        })
        .collect()
}

/// Starter parts granted to every new account; the first one starts active.
pub const STARTER_COA_PARTS: &[DbId] = &[10, 11, 12, 13];

pub fn coa_colors() -> Vec<CoaColor> {
    (1..=5)
        .map(|id| CoaColor {
            id,
            name: format!("Color{id}"),
        })
        .collect()
}

pub fn settings() -> Settings {
    Settings {
        guest_number: 1,
        wifi_ssid: "museum-guide".into(),
        wifi_password: "changeme".into(),
        app_version: "1.0.0".into(),
    }
}
