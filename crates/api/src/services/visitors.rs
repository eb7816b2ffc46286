//! Visitor accounts: registration, guest accounts, login flows, and the
//! profile maintenance operations.
//!
//! Account-creating and login operations bind the session on success: the
//! freshly signed token is attached to the session and the visitor id is
//! bound for targeted pushes.

use curio_core::envelope::{Envelope, CODE_INVALID_TOKEN, CODE_LOGIN_FAILED, CODE_STORAGE_FAILURE};
use curio_core::types::DbId;
use curio_events::{names, GuideEvent};
use curio_store::models::{LogEntry, NewVisitor, VisitorProfile};
use curio_store::seed::STARTER_COA_PARTS;
use serde::{Deserialize, Serialize};

use crate::auth::{jwt, password};
use crate::services::progress::{lookup_table, LookupLocation};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub language: DbId,
    #[serde(flatten)]
    pub device: DeviceData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRequest {
    pub language: DbId,
    #[serde(flatten)]
    pub device: DeviceData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    pub device_address: Option<String>,
    pub device_os: Option<String>,
    pub device_version: Option<String>,
    pub device_model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
    #[serde(flatten)]
    pub device: DeviceData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRequest {
    pub user: DbId,
    pub language: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub user: DbId,
    pub current_password: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakePermanentRequest {
    pub user: DbId,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRequest {
    pub user: DbId,
    #[serde(default = "default_true")]
    pub answered: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameOrEmailRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCheckRequest {
    pub user: DbId,
    #[serde(flatten)]
    pub device: DeviceData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryRequest {
    pub user: DbId,
    pub log_type: i32,
    pub location: Option<DbId>,
    pub comment: Option<String>,
}

/// Login/registration result: the signed token, the public profile, and
/// the visitor's annotated location list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub token: String,
    pub user: VisitorProfile,
    pub locations: Vec<LookupLocation>,
}

/// Credential-change result: new token and profile, no location list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAndProfile {
    pub token: String,
    pub user: VisitorProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsData {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameOrEmailData {
    pub name: bool,
    pub email: bool,
}

// ---------------------------------------------------------------------------
// Account creation
// ---------------------------------------------------------------------------

/// Register a full account: unique name and email, argon2-hashed password,
/// starter coat-of-arms parts granted with the first shield active.
pub async fn register_visitor(
    state: &AppState,
    session_id: &str,
    req: RegisterRequest,
) -> Envelope<AccountData> {
    let hash = match password::hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "Password hashing failed");
            return Envelope::failure(CODE_STORAGE_FAILURE, "Could not create user");
        }
    };

    let visitor = match state
        .store
        .visitors
        .create(NewVisitor {
            name: req.name,
            email: Some(req.email),
            password_hash: Some(hash),
            is_guest: false,
            content_language: req.language,
            socket_id: Some(session_id.to_owned()),
            device_address: req.device.device_address,
            device_os: req.device.device_os,
            device_version: req.device.device_version,
            device_model: req.device.device_model,
        })
        .await
    {
        Ok(v) => v,
        Err(e) => return e.into(),
    };

    grant_starter_parts(state, visitor.id).await;
    tracing::info!(visitor_id = visitor.id, "Visitor registered");

    match bind_account(state, session_id, visitor.id).await {
        Ok(data) => Envelope::created(data, "User created successfully"),
        Err(env) => env,
    }
}

/// Register a guest account with a generated `Guest<n>` name. The counter
/// is advanced until a free name is found.
pub async fn register_guest(
    state: &AppState,
    session_id: &str,
    req: GuestRequest,
) -> Envelope<AccountData> {
    let mut name = format!("Guest{}", state.store.settings.next_guest_number());
    while state.store.visitors.name_exists(&name).await {
        name = format!("Guest{}", state.store.settings.next_guest_number());
    }

    let visitor = match state
        .store
        .visitors
        .create(NewVisitor {
            name,
            email: None,
            password_hash: None,
            is_guest: true,
            content_language: req.language,
            socket_id: Some(session_id.to_owned()),
            device_address: req.device.device_address,
            device_os: req.device.device_os,
            device_version: req.device.device_version,
            device_model: req.device.device_model,
        })
        .await
    {
        Ok(v) => v,
        Err(e) => return e.into(),
    };

    grant_starter_parts(state, visitor.id).await;
    tracing::info!(visitor_id = visitor.id, name = %visitor.name, "Guest registered");

    match bind_account(state, session_id, visitor.id).await {
        Ok(data) => Envelope::created(data, "Guest created successfully"),
        Err(env) => env,
    }
}

async fn grant_starter_parts(state: &AppState, visitor_id: DbId) {
    for &part in STARTER_COA_PARTS {
        let active = part == STARTER_COA_PARTS[0];
        if let Err(e) = state.store.coa.grant(visitor_id, part, active).await {
            tracing::error!(visitor_id, part, error = %e, "Failed to grant starter part");
        }
    }
}

// ---------------------------------------------------------------------------
// Login flows
// ---------------------------------------------------------------------------

/// Credential login. Rejections never reveal whether the name or the
/// password was wrong.
pub async fn login(state: &AppState, session_id: &str, req: LoginRequest) -> Envelope<AccountData> {
    let Some(visitor) = state.store.visitors.find_by_name(&req.name).await else {
        return Envelope::failure(CODE_LOGIN_FAILED, "Credentials are not matching!");
    };
    let Some(hash) = &visitor.password_hash else {
        return Envelope::failure(CODE_LOGIN_FAILED, "Credentials are not matching!");
    };
    match password::verify_password(&req.password, hash) {
        Ok(true) => {}
        Ok(false) => return Envelope::failure(CODE_LOGIN_FAILED, "Credentials are not matching!"),
        Err(e) => {
            tracing::error!(error = %e, "Password verification failed");
            return Envelope::failure(CODE_STORAGE_FAILURE, "Could not verify credentials");
        }
    }

    let session = session_id.to_owned();
    let device = req.device;
    if let Err(e) = state
        .store
        .visitors
        .update(visitor.id, move |v| {
            v.socket_id = Some(session);
            apply_device(v, device);
        })
        .await
    {
        return e.into();
    }

    state
        .bus
        .publish(GuideEvent::new(names::VISITOR_LOGIN).by_visitor(visitor.id));

    match bind_account(state, session_id, visitor.id).await {
        Ok(data) => Envelope::logged_in(data, "Logged in successfully"),
        Err(env) => env,
    }
}

/// Token-based re-login on reconnect. Re-binds the socket and issues a
/// fresh token.
pub async fn auto_login(state: &AppState, session_id: &str, token: &str) -> Envelope<AccountData> {
    let claims = match jwt::validate_token(token, &state.config.jwt) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Auto-login token rejected");
            return Envelope::failure(CODE_INVALID_TOKEN, "Invalid token!");
        }
    };

    let visitor = match state.store.visitors.get(claims.sub).await {
        Ok(v) if !v.is_deleted => v,
        _ => return Envelope::failure(CODE_INVALID_TOKEN, "Invalid token!"),
    };

    let session = session_id.to_owned();
    if let Err(e) = state
        .store
        .visitors
        .update(visitor.id, move |v| v.socket_id = Some(session))
        .await
    {
        return e.into();
    }

    state
        .bus
        .publish(GuideEvent::new(names::VISITOR_AUTO_LOGIN).by_visitor(visitor.id));

    match bind_account(state, session_id, visitor.id).await {
        Ok(data) => Envelope::logged_in(data, "Logged in successfully"),
        Err(env) => env,
    }
}

/// Sign a token for the visitor, bind it to the session, and assemble the
/// account payload.
async fn bind_account(
    state: &AppState,
    session_id: &str,
    visitor_id: DbId,
) -> Result<AccountData, Envelope<AccountData>> {
    let visitor = state
        .store
        .visitors
        .get(visitor_id)
        .await
        .map_err(Envelope::from)?;

    let token = jwt::generate_token(visitor.id, visitor.is_guest, &state.config.jwt)
        .map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            Envelope::failure(CODE_STORAGE_FAILURE, "Could not create token")
        })?;

    state.sessions.set_token(session_id, token.clone()).await;
    state.sessions.bind_visitor(session_id, visitor.id).await;

    let locations = lookup_table(state, &visitor).await;
    Ok(AccountData {
        token,
        user: VisitorProfile::from(&visitor),
        locations,
    })
}

fn apply_device(v: &mut curio_store::models::Visitor, device: DeviceData) {
    if device.device_address.is_some() {
        v.device_address = device.device_address;
    }
    if device.device_os.is_some() {
        v.device_os = device.device_os;
    }
    if device.device_version.is_some() {
        v.device_version = device.device_version;
    }
    if device.device_model.is_some() {
        v.device_model = device.device_model;
    }
}

// ---------------------------------------------------------------------------
// Profile maintenance
// ---------------------------------------------------------------------------

pub async fn update_language(state: &AppState, req: LanguageRequest) -> Envelope<VisitorProfile> {
    match state
        .store
        .visitors
        .update(req.user, |v| {
            v.content_language = req.language;
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(profile) => Envelope::updated(profile, "Language updated"),
        Err(e) => e.into(),
    }
}

/// Change name, email, or password. The current password must verify
/// first; a fresh token is issued because the profile inside it changed.
pub async fn update_credentials(
    state: &AppState,
    session_id: &str,
    req: CredentialsRequest,
) -> Envelope<TokenAndProfile> {
    let visitor = match state.store.visitors.get(req.user).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    let Some(hash) = &visitor.password_hash else {
        return Envelope::failure(CODE_LOGIN_FAILED, "Credentials are not matching!");
    };
    if !password::verify_password(&req.current_password, hash).unwrap_or(false) {
        return Envelope::failure(CODE_LOGIN_FAILED, "Credentials are not matching!");
    }

    if let Some(name) = &req.name {
        if *name != visitor.name && state.store.visitors.name_exists(name).await {
            return Envelope::failure(
                curio_core::envelope::CODE_CONFLICT,
                "Username is already existing!",
            );
        }
    }
    if let Some(email) = &req.email {
        if visitor.email.as_ref() != Some(email) && state.store.visitors.email_exists(email).await
        {
            return Envelope::failure(
                curio_core::envelope::CODE_CONFLICT,
                "Email is already existing!",
            );
        }
    }

    let new_hash = match &req.password {
        Some(pwd) => match password::hash_password(pwd) {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                return Envelope::failure(CODE_STORAGE_FAILURE, "Could not update user");
            }
        },
        None => None,
    };

    let profile = match state
        .store
        .visitors
        .update(req.user, move |v| {
            if let Some(name) = req.name {
                v.name = name;
            }
            if let Some(email) = req.email {
                v.email = Some(email);
            }
            if let Some(hash) = new_hash {
                v.password_hash = Some(hash);
            }
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(p) => p,
        Err(e) => return e.into(),
    };

    match reissue_token(state, session_id, &profile).await {
        Ok(token) => Envelope::updated(TokenAndProfile { token, user: profile }, "User updated"),
        Err(env) => env,
    }
}

/// Promote a guest account to a full account.
pub async fn make_guest_permanent(
    state: &AppState,
    session_id: &str,
    req: MakePermanentRequest,
) -> Envelope<TokenAndProfile> {
    let visitor = match state.store.visitors.get(req.user).await {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    if !visitor.is_guest {
        return Envelope::not_modified("Account is already permanent");
    }

    if req.name != visitor.name && state.store.visitors.name_exists(&req.name).await {
        return Envelope::failure(
            curio_core::envelope::CODE_CONFLICT,
            "Username is already existing!",
        );
    }
    if state.store.visitors.email_exists(&req.email).await {
        return Envelope::failure(
            curio_core::envelope::CODE_CONFLICT,
            "Email is already existing!",
        );
    }

    let hash = match password::hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "Password hashing failed");
            return Envelope::failure(CODE_STORAGE_FAILURE, "Could not update user");
        }
    };

    let profile = match state
        .store
        .visitors
        .update(req.user, move |v| {
            v.name = req.name;
            v.email = Some(req.email);
            v.password_hash = Some(hash);
            v.is_guest = false;
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(p) => p,
        Err(e) => return e.into(),
    };

    match reissue_token(state, session_id, &profile).await {
        Ok(token) => Envelope::updated(TokenAndProfile { token, user: profile }, "User updated"),
        Err(env) => env,
    }
}

async fn reissue_token<T: serde::Serialize>(
    state: &AppState,
    session_id: &str,
    profile: &VisitorProfile,
) -> Result<String, Envelope<T>> {
    let token = jwt::generate_token(profile.id, profile.is_guest, &state.config.jwt)
        .map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            Envelope::failure(CODE_STORAGE_FAILURE, "Could not create token")
        })?;
    // The session keeps working with the new identity without a re-login.
    state.sessions.set_token(session_id, token.clone()).await;
    Ok(token)
}

pub async fn update_questionnaire_answered(
    state: &AppState,
    req: QuestionnaireRequest,
) -> Envelope<VisitorProfile> {
    match state
        .store
        .visitors
        .update(req.user, |v| {
            v.answered_questionnaire = req.answered;
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(profile) => Envelope::updated(profile, "Questionnaire state updated"),
        Err(e) => e.into(),
    }
}

/// Soft delete. Fire-and-forget: the client drops the account locally and
/// expects no reply.
pub async fn delete_visitor(state: &AppState, visitor_id: DbId) {
    match state.store.visitors.soft_delete(visitor_id).await {
        Ok(()) => tracing::info!(visitor_id, "Visitor soft-deleted"),
        Err(e) => tracing::warn!(visitor_id, error = %e, "Delete of unknown visitor"),
    }
}

// ---------------------------------------------------------------------------
// Existence checks and device/log bookkeeping
// ---------------------------------------------------------------------------

pub async fn check_name_exists(state: &AppState, name: &str) -> Envelope<ExistsData> {
    Envelope::ok(
        ExistsData {
            exists: state.store.visitors.name_exists(name).await,
        },
        "Name checked",
    )
}

pub async fn check_email_exists(state: &AppState, email: &str) -> Envelope<ExistsData> {
    Envelope::ok(
        ExistsData {
            exists: state.store.visitors.email_exists(email).await,
        },
        "Email checked",
    )
}

pub async fn check_name_or_email_exists(
    state: &AppState,
    req: NameOrEmailRequest,
) -> Envelope<NameOrEmailData> {
    Envelope::ok(
        NameOrEmailData {
            name: state.store.visitors.name_exists(&req.name).await,
            email: state.store.visitors.email_exists(&req.email).await,
        },
        "Name and email checked",
    )
}

/// Refresh stored device metadata when the client reports a change.
pub async fn check_device_data(state: &AppState, req: DeviceCheckRequest) -> Envelope<VisitorProfile> {
    match state
        .store
        .visitors
        .update(req.user, move |v| {
            apply_device(v, req.device);
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(profile) => Envelope::ok(profile, "Device data checked"),
        Err(e) => e.into(),
    }
}

/// Client-defined log entry; the raw code passes through unchanged.
pub async fn add_log_entry(state: &AppState, req: LogEntryRequest) -> Envelope<()> {
    if let Err(e) = state.store.visitors.get(req.user).await {
        return e.into();
    }
    state
        .store
        .logs
        .append(LogEntry {
            visitor_id: req.user,
            log_type: req.log_type,
            location_id: req.location,
            comment: req.comment,
            timestamp: chrono::Utc::now(),
        })
        .await;
    Envelope::created((), "Log entry created")
}
