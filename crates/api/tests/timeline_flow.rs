//! Sequential timeline unlocks, section openers, and the lookup table.

use curio_core::envelope::{CODE_NOT_MODIFIED, CODE_OK, CODE_UPDATED};
use curio_api::services::progress::{
    self, LocationLikeRequest, TimelineUpdateRequest,
};

mod common;

fn unlock(user: i64, location: i64) -> TimelineUpdateRequest {
    TimelineUpdateRequest { user, location }
}

// ---------------------------------------------------------------------------
// Test: the predecessor gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gated_location_needs_its_predecessor_unlocked_first() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    // 1000 -> 101 in the timeline edge list; 101 is locked until 1000 opens.
    let env = progress::register_timeline_update(&state, unlock(anna.id, 101)).await;
    assert_eq!(env.message.code, CODE_NOT_MODIFIED);
    assert_eq!(env.message.text, "Previous timeline location is still locked");

    let env = progress::register_timeline_update(&state, unlock(anna.id, 1000)).await;
    assert_eq!(env.message.code, CODE_UPDATED);

    let env = progress::register_timeline_update(&state, unlock(anna.id, 101)).await;
    assert_eq!(env.message.code, CODE_UPDATED);
    let locations = env.data.unwrap().locations;
    let loc_101 = locations.iter().find(|l| l.location.id == 101).unwrap();
    assert!(!loc_101.locked);
}

#[tokio::test]
async fn re_unlocking_reports_already_seen() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    progress::register_timeline_update(&state, unlock(anna.id, 1000)).await;
    let env = progress::register_timeline_update(&state, unlock(anna.id, 1000)).await;

    assert_eq!(env.message.code, CODE_OK);
    assert_eq!(env.message.text, "Timeline location was already unlocked");
}

#[tokio::test]
async fn gating_is_per_visitor() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;
    let ben = common::seed_visitor(&state, "ben").await;

    progress::register_timeline_update(&state, unlock(anna.id, 1000)).await;
    progress::register_timeline_update(&state, unlock(anna.id, 101)).await;

    // Anna's progress does not open the gate for Ben.
    let env = progress::register_timeline_update(&state, unlock(ben.id, 101)).await;
    assert_eq!(env.message.code, CODE_NOT_MODIFIED);
}

// ---------------------------------------------------------------------------
// Test: section openers also unlock the section door
// ---------------------------------------------------------------------------

#[tokio::test]
async fn section_opener_unlocks_the_section_activity() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    // 5021 opens section 5000.
    let env = progress::register_timeline_update(&state, unlock(anna.id, 5021)).await;
    assert_eq!(env.message.code, CODE_UPDATED);

    let section = state.store.activities.get(anna.id, 5000).await.unwrap();
    assert!(!section.locked);
}

// ---------------------------------------------------------------------------
// Test: the curator reset and the lookup table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlock_all_opens_every_timeline_location() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    let env = progress::unlock_all_timeline_locations(&state, anna.id).await;
    assert_eq!(env.message.code, CODE_UPDATED);

    for entry in env.data.unwrap().locations {
        if entry.location.show_in_timeline {
            assert!(!entry.locked, "location {} must be unlocked", entry.location.id);
        }
    }
}

#[tokio::test]
async fn lookup_table_defaults_to_locked_and_unliked() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    let env = progress::get_lookup_table(&state, anna.id).await;
    assert_eq!(env.message.code, CODE_OK);

    let locations = env.data.unwrap().locations;
    assert!(!locations.is_empty());
    for entry in &locations {
        assert!(entry.locked);
        assert!(!entry.liked);
    }
}

#[tokio::test]
async fn lookup_table_filters_content_by_language() {
    let state = common::test_state();
    // seed_visitor uses language 1 (English).
    let anna = common::seed_visitor(&state, "anna").await;

    let env = progress::get_lookup_table(&state, anna.id).await;
    let locations = env.data.unwrap().locations;

    let door = locations.iter().find(|l| l.location.id == 1000).unwrap();
    assert_eq!(door.content.len(), 1);
    assert_eq!(door.content[0].content, "Welcome to the exhibition!");

    // 101 has one English row plus a wildcard image row.
    let quiz = locations.iter().find(|l| l.location.id == 101).unwrap();
    assert_eq!(quiz.content.len(), 2);
}

#[tokio::test]
async fn lookup_table_for_unknown_visitor_fails() {
    let state = common::test_state();
    let env = progress::get_lookup_table(&state, 9999).await;
    assert!(!env.message.is_success());
}

// ---------------------------------------------------------------------------
// Test: likes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_toggle_round_trips() {
    let state = common::test_state();
    let anna = common::seed_visitor(&state, "anna").await;

    let env = progress::update_location_like(
        &state,
        LocationLikeRequest {
            user: anna.id,
            location: 2001,
            like: true,
        },
    )
    .await;
    assert_eq!(env.message.code, CODE_UPDATED);
    assert!(env.data.unwrap().liked);

    let env = progress::update_location_like(
        &state,
        LocationLikeRequest {
            user: anna.id,
            location: 2001,
            like: false,
        },
    )
    .await;
    assert!(!env.data.unwrap().liked);

    // Liking never unlocks.
    let activity = state.store.activities.get(anna.id, 2001).await.unwrap();
    assert!(activity.locked);
}
