//! WebSocket upgrade and inbound event dispatch.
//!
//! Each inbound frame is handled by its own spawned task that pushes
//! exactly one `<event>Result` frame back to the originating session (or
//! none, for the fire-and-forget administrative events). A dropped visitor
//! connection resets the visitor to the start point; a dropped kiosk
//! connection takes its exhibit offline.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use curio_core::envelope::{Envelope, CODE_INVALID_REQUEST, CODE_INVALID_TOKEN};
use curio_core::types::DbId;

use crate::auth::jwt;
use crate::services::{heraldry, occupancy, progress, settings, visitors};
use crate::state::AppState;
use crate::ws::protocol::{self, ClientFrame};

/// Payload carrying only a visitor reference.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRef {
    user: DbId,
}

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the session with the registry.
///   2. Spawns a sender task that forwards frames from the registry channel.
///   3. Dispatches inbound frames, one spawned task each.
///   4. Runs the disconnect path and cleans up.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(session_id = %session_id, "WebSocket connected");

    let mut rx = state.sessions.add(session_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward registry frames to the WebSocket sink.
    let sender_session_id = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(session_id = %sender_session_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(session_id = %session_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => {
                    let state = state.clone();
                    let session_id = session_id.clone();
                    tokio::spawn(async move {
                        dispatch(&state, &session_id, frame).await;
                    });
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Unparseable frame");
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    handle_disconnect(&state, &session_id).await;

    state.sessions.remove(&session_id).await;
    send_task.abort();
    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

/// Disconnect path: a token-bearing session is a visitor, everything else
/// might be a kiosk.
async fn handle_disconnect(state: &AppState, session_id: &str) {
    match state.sessions.token_of(session_id).await {
        Some(token) => {
            if let Ok(claims) = jwt::validate_token(&token, &state.config.jwt) {
                if let Err(e) = occupancy::reset_user_location(state, claims.sub).await {
                    tracing::warn!(visitor_id = claims.sub, error = %e, "Reset on disconnect failed");
                }
            }
        }
        None => occupancy::shutdown_exhibit(state, session_id).await,
    }
}

/// Route one inbound frame to its service call and push the result.
async fn dispatch(state: &AppState, session_id: &str, frame: ClientFrame) {
    let event = frame.event.clone();
    let event = event.as_str();

    if protocol::token_required(event) && !token_is_valid(state, session_id).await {
        tracing::warn!(session_id, event, "Rejected event without valid token");
        let env: Envelope<()> = Envelope::failure(CODE_INVALID_TOKEN, "Invalid token!");
        reply(state, session_id, event, &env).await;
        return;
    }

    match event {
        protocol::EV_ADD_TOKEN => {
            if let Some(token) = frame.payload.as_str() {
                state.sessions.set_token(session_id, token.to_owned()).await;
            }
        }

        // -- Accounts --
        protocol::EV_REGISTER_VISITOR => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::register_visitor(state, session_id, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_REGISTER_GUEST => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::register_guest(state, session_id, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_LOGIN => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::login(state, session_id, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_AUTO_LOGIN => {
            let env = match frame.payload.as_str() {
                Some(token) => visitors::auto_login(state, session_id, token).await,
                None => Envelope::failure(CODE_INVALID_REQUEST, "Malformed payload"),
            };
            reply(state, session_id, event, &env).await;
        }
        protocol::EV_DELETE_VISITOR => {
            // Fire-and-forget.
            if let Ok(UserRef { user }) = parse::<UserRef>(frame.payload) {
                visitors::delete_visitor(state, user).await;
            }
        }
        protocol::EV_UPDATE_LANGUAGE => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::update_language(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_CHANGE_CREDENTIALS => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::update_credentials(state, session_id, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_MAKE_GUEST_PERMANENT => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::make_guest_permanent(state, session_id, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_QUESTIONNAIRE_ANSWERED => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::update_questionnaire_answered(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_CHECK_USERNAME_EXISTS => {
            let env = match frame.payload.as_str() {
                Some(name) => visitors::check_name_exists(state, name).await,
                None => Envelope::failure(CODE_INVALID_REQUEST, "Malformed payload"),
            };
            reply(state, session_id, event, &env).await;
        }
        protocol::EV_CHECK_EMAIL_EXISTS => {
            let env = match frame.payload.as_str() {
                Some(email) => visitors::check_email_exists(state, email).await,
                None => Envelope::failure(CODE_INVALID_REQUEST, "Malformed payload"),
            };
            reply(state, session_id, event, &env).await;
        }
        protocol::EV_CHECK_NAME_OR_EMAIL_EXISTS => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::check_name_or_email_exists(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_CHECK_DEVICE_DATA => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::check_device_data(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_ADD_LOG_ENTRY => match parse(frame.payload) {
            Ok(req) => {
                let env = visitors::add_log_entry(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },

        // -- Occupancy --
        protocol::EV_REGISTER_LOCATION => match parse(frame.payload) {
            Ok(req) => {
                let env = occupancy::register_location(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_DISCONNECTED_FROM_EXHIBIT | protocol::EV_EXHIBIT_DISCONNECTED => {
            match parse(frame.payload) {
                Ok(req) => {
                    let env = occupancy::disconnect_from_exhibit(state, req).await;
                    reply(state, session_id, event, &env).await;
                }
                Err(env) => reply(state, session_id, event, &env).await,
            }
        }
        protocol::EV_DISCONNECT_USERS => {
            // Fire-and-forget.
            if let Ok(req) = parse::<occupancy::TableDisconnectRequest>(frame.payload) {
                occupancy::table_disconnect_from_exhibit(state, req).await;
            }
        }
        protocol::EV_UPDATE_SEAT => {
            // Fire-and-forget.
            if let Ok(req) = parse::<occupancy::UpdateSeatRequest>(frame.payload) {
                occupancy::update_location_seat(state, req).await;
            }
        }
        protocol::EV_LOGIN_EXHIBIT => {
            let env = match frame.payload.as_str() {
                Some(ip) => occupancy::login_exhibit(state, session_id, ip).await,
                None => Envelope::failure(CODE_INVALID_REQUEST, "Malformed payload"),
            };
            reply(state, session_id, event, &env).await;
        }
        protocol::EV_CHECK_LOCATION_STATUS => match parse::<DbId>(frame.payload) {
            Ok(location) => {
                let env = occupancy::check_location_status(state, location).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },

        // -- Progress --
        protocol::EV_REGISTER_TIMELINE_UPDATE => match parse(frame.payload) {
            Ok(req) => {
                let env = progress::register_timeline_update(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_UNLOCK_ALL_TIMELINE => match parse::<UserRef>(frame.payload) {
            Ok(UserRef { user }) => {
                let env = progress::unlock_all_timeline_locations(state, user).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_REGISTER_LOCATION_LIKE => match parse(frame.payload) {
            Ok(req) => {
                let env = progress::update_location_like(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_GET_LOOKUP_TABLE => match parse::<UserRef>(frame.payload) {
            Ok(UserRef { user }) => {
                let env = progress::get_lookup_table(state, user).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },

        // -- Coat of arms --
        protocol::EV_GET_COA_PARTS => {
            reply(state, session_id, event, &heraldry::get_coa_parts(state)).await;
        }
        protocol::EV_GET_COA_COLORS => {
            reply(state, session_id, event, &heraldry::get_coa_colors(state)).await;
        }
        protocol::EV_GET_VISITOR_COA_PARTS => match parse::<UserRef>(frame.payload) {
            Ok(UserRef { user }) => {
                let env = heraldry::get_visitor_coa_parts(state, user).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_UNLOCK_COA_PART | protocol::EV_UNLOCK_COA_PART_FROM_EXHIBIT => {
            match parse(frame.payload) {
                Ok(req) => {
                    let env = heraldry::unlock_coa_part(state, req).await;
                    reply(state, session_id, event, &env).await;
                }
                Err(env) => reply(state, session_id, event, &env).await,
            }
        }
        protocol::EV_CHANGE_COA_PART => match parse(frame.payload) {
            Ok(req) => {
                let env = heraldry::change_visitor_coa_part(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },
        protocol::EV_CHANGE_COA_COLORS => match parse(frame.payload) {
            Ok(req) => {
                let env = heraldry::change_visitor_coa_colors(state, req).await;
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },

        // -- Settings --
        protocol::EV_GET_WIFI_SSID => {
            reply(state, session_id, event, &settings::wifi_credentials(state)).await;
        }
        protocol::EV_CHECK_APP_VERSION => match parse(frame.payload) {
            Ok(req) => {
                let env = settings::check_app_version(state, req);
                reply(state, session_id, event, &env).await;
            }
            Err(env) => reply(state, session_id, event, &env).await,
        },

        other => {
            tracing::warn!(session_id, event = other, "Unknown event");
        }
    }
}

async fn token_is_valid(state: &AppState, session_id: &str) -> bool {
    match state.sessions.token_of(session_id).await {
        Some(token) => jwt::validate_token(&token, &state.config.jwt).is_ok(),
        None => false,
    }
}

/// Parse a payload, mapping malformed input to an `InvalidRequest`
/// envelope.
fn parse<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, Envelope<()>> {
    serde_json::from_value(payload)
        .map_err(|_| Envelope::failure(CODE_INVALID_REQUEST, "Malformed payload"))
}

async fn reply<T: Serialize>(state: &AppState, session_id: &str, event: &str, envelope: &Envelope<T>) {
    state
        .sessions
        .send_to_session(session_id, &protocol::result_event(event), envelope)
        .await;
}
