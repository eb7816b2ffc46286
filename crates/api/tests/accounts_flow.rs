//! Account lifecycle: registration, guest accounts, logins, credential
//! changes, and the existence checks.

use curio_core::envelope::{
    CODE_CONFLICT, CODE_CREATED, CODE_INVALID_TOKEN, CODE_LOGGED_IN, CODE_LOGIN_FAILED,
    CODE_NOT_MODIFIED, CODE_UPDATED,
};
use curio_api::auth::jwt;
use curio_api::services::visitors::{
    self, CredentialsRequest, DeviceData, GuestRequest, LoginRequest, MakePermanentRequest,
    NameOrEmailRequest, RegisterRequest,
};
use curio_api::state::AppState;

mod common;

fn register(name: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.into(),
        email: email.into(),
        password: "hunter2!".into(),
        language: 1,
        device: DeviceData::default(),
    }
}

async fn session(state: &AppState, id: &str) {
    state.sessions.add(id.to_string()).await;
}

// ---------------------------------------------------------------------------
// Test: registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registration_returns_token_profile_and_locations() {
    let state = common::test_state();
    session(&state, "s1").await;

    let env = visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;
    assert_eq!(env.message.code, CODE_CREATED);
    assert_eq!(env.message.text, "User created successfully");

    let data = env.data.unwrap();
    assert_eq!(data.user.name, "anna");
    assert!(!data.user.is_guest);
    assert!(!data.locations.is_empty());

    // The token is real and names the new visitor.
    let claims = jwt::validate_token(&data.token, &state.config.jwt).expect("valid token");
    assert_eq!(claims.sub, data.user.id);

    // The session was bound for pushes and token checks.
    assert_eq!(state.sessions.visitor_of("s1").await, Some(data.user.id));
    assert_eq!(state.sessions.token_of("s1").await, Some(data.token));
}

#[tokio::test]
async fn registration_grants_the_starter_shields() {
    let state = common::test_state();
    session(&state, "s1").await;

    let env = visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;
    let visitor_id = env.data.unwrap().user.id;

    let parts = state.store.coa.parts_for_visitor(visitor_id).await;
    assert_eq!(parts.len(), 4);
    assert!(parts[0].is_active);
    assert!(parts[1..].iter().all(|p| !p.is_active));
}

#[tokio::test]
async fn duplicate_name_and_email_are_conflicts() {
    let state = common::test_state();
    session(&state, "s1").await;
    visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;

    let env = visitors::register_visitor(&state, "s1", register("anna", "other@example.org")).await;
    assert_eq!(env.message.code, CODE_CONFLICT);
    assert_eq!(env.message.text, "Username is already existing!");

    let env = visitors::register_visitor(&state, "s1", register("berta", "anna@example.org")).await;
    assert_eq!(env.message.code, CODE_CONFLICT);
    assert_eq!(env.message.text, "Email is already existing!");
}

#[tokio::test]
async fn guest_names_are_generated_sequentially() {
    let state = common::test_state();
    session(&state, "s1").await;
    session(&state, "s2").await;

    let req = || GuestRequest {
        language: 1,
        device: DeviceData::default(),
    };
    let first = visitors::register_guest(&state, "s1", req()).await;
    let second = visitors::register_guest(&state, "s2", req()).await;

    assert_eq!(first.data.unwrap().user.name, "Guest1");
    assert_eq!(second.data.unwrap().user.name, "Guest2");
}

#[tokio::test]
async fn guest_counter_skips_taken_names() {
    let state = common::test_state();
    session(&state, "s1").await;
    common::seed_visitor(&state, "Guest1").await;

    let env = visitors::register_guest(
        &state,
        "s1",
        GuestRequest {
            language: 1,
            device: DeviceData::default(),
        },
    )
    .await;
    assert_eq!(env.data.unwrap().user.name, "Guest2");
}

// ---------------------------------------------------------------------------
// Test: login flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let state = common::test_state();
    session(&state, "s1").await;
    session(&state, "s2").await;
    visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;

    let env = visitors::login(
        &state,
        "s2",
        LoginRequest {
            name: "anna".into(),
            password: "hunter2!".into(),
            device: DeviceData::default(),
        },
    )
    .await;

    assert_eq!(env.message.code, CODE_LOGGED_IN);
    let data = env.data.unwrap();
    assert_eq!(data.user.name, "anna");
    assert!(jwt::validate_token(&data.token, &state.config.jwt).is_ok());
}

#[tokio::test]
async fn login_rejections_are_uniform() {
    let state = common::test_state();
    session(&state, "s1").await;
    visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;

    // Wrong password and unknown name read exactly the same.
    for (name, password) in [("anna", "wrong"), ("nobody", "hunter2!")] {
        let env = visitors::login(
            &state,
            "s1",
            LoginRequest {
                name: name.into(),
                password: password.into(),
                device: DeviceData::default(),
            },
        )
        .await;
        assert_eq!(env.message.code, CODE_LOGIN_FAILED);
        assert_eq!(env.message.text, "Credentials are not matching!");
    }
}

#[tokio::test]
async fn auto_login_replays_a_stored_token() {
    let state = common::test_state();
    session(&state, "s1").await;
    session(&state, "s2").await;
    let env = visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;
    let token = env.data.unwrap().token;

    // Fresh connection, replayed token.
    let env = visitors::auto_login(&state, "s2", &token).await;
    assert_eq!(env.message.code, CODE_LOGGED_IN);
    assert_eq!(env.data.unwrap().user.name, "anna");
}

#[tokio::test]
async fn auto_login_rejects_garbage_and_deleted_accounts() {
    let state = common::test_state();
    session(&state, "s1").await;

    let env = visitors::auto_login(&state, "s1", "not-a-token").await;
    assert_eq!(env.message.code, CODE_INVALID_TOKEN);
    assert_eq!(env.message.text, "Invalid token!");

    let reg = visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;
    let data = reg.data.unwrap();
    visitors::delete_visitor(&state, data.user.id).await;

    let env = visitors::auto_login(&state, "s1", &data.token).await;
    assert_eq!(env.message.code, CODE_INVALID_TOKEN);
}

// ---------------------------------------------------------------------------
// Test: credential changes and guest promotion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn credential_change_requires_the_current_password() {
    let state = common::test_state();
    session(&state, "s1").await;
    let reg = visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;
    let visitor_id = reg.data.unwrap().user.id;

    let env = visitors::update_credentials(
        &state,
        "s1",
        CredentialsRequest {
            user: visitor_id,
            current_password: "wrong".into(),
            name: Some("annette".into()),
            email: None,
            password: None,
        },
    )
    .await;
    assert_eq!(env.message.code, CODE_LOGIN_FAILED);

    let env = visitors::update_credentials(
        &state,
        "s1",
        CredentialsRequest {
            user: visitor_id,
            current_password: "hunter2!".into(),
            name: Some("annette".into()),
            email: None,
            password: None,
        },
    )
    .await;
    assert_eq!(env.message.code, CODE_UPDATED);
    let data = env.data.unwrap();
    assert_eq!(data.user.name, "annette");
    // The reissued token carries the same identity.
    let claims = jwt::validate_token(&data.token, &state.config.jwt).expect("valid token");
    assert_eq!(claims.sub, visitor_id);
}

#[tokio::test]
async fn guest_promotion_sets_credentials_once() {
    let state = common::test_state();
    session(&state, "s1").await;
    let guest = visitors::register_guest(
        &state,
        "s1",
        GuestRequest {
            language: 1,
            device: DeviceData::default(),
        },
    )
    .await;
    let guest_id = guest.data.unwrap().user.id;

    let promote = |name: &str| MakePermanentRequest {
        user: guest_id,
        name: name.into(),
        email: format!("{name}@example.org"),
        password: "hunter2!".into(),
    };

    let env = visitors::make_guest_permanent(&state, "s1", promote("anna")).await;
    assert_eq!(env.message.code, CODE_UPDATED);
    assert!(!env.data.unwrap().user.is_guest);

    // Promoting an already-permanent account is a no-op.
    let env = visitors::make_guest_permanent(&state, "s1", promote("berta")).await;
    assert_eq!(env.message.code, CODE_NOT_MODIFIED);
    assert_eq!(env.message.text, "Account is already permanent");
}

// ---------------------------------------------------------------------------
// Test: existence checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn existence_checks_report_both_fields() {
    let state = common::test_state();
    session(&state, "s1").await;
    visitors::register_visitor(&state, "s1", register("anna", "anna@example.org")).await;

    let env = visitors::check_name_exists(&state, "anna").await;
    assert!(env.data.unwrap().exists);
    let env = visitors::check_name_exists(&state, "nobody").await;
    assert!(!env.data.unwrap().exists);

    let env = visitors::check_name_or_email_exists(
        &state,
        NameOrEmailRequest {
            name: "nobody".into(),
            email: "anna@example.org".into(),
        },
    )
    .await;
    let data = env.data.unwrap();
    assert!(!data.name);
    assert!(data.email);
}
