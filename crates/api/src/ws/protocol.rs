//! Wire protocol of the session gateway.
//!
//! Inbound frames are `{"event": <name>, "payload": {...}}`; each maps to
//! one service call and one `<event>Result` outbound frame, except for the
//! fire-and-forget administrative events.

use serde::Deserialize;
use serde_json::Value;

/// One inbound client frame.
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

/// The outbound event name paired with an inbound event.
pub fn result_event(event: &str) -> String {
    format!("{event}Result")
}

// Inbound events.
pub const EV_ADD_TOKEN: &str = "addTokenToSocket";
pub const EV_REGISTER_VISITOR: &str = "registerVisitor";
pub const EV_REGISTER_GUEST: &str = "registerGuest";
pub const EV_LOGIN: &str = "login";
pub const EV_AUTO_LOGIN: &str = "autoLogin";
pub const EV_DELETE_VISITOR: &str = "deleteVisitor";
pub const EV_QUESTIONNAIRE_ANSWERED: &str = "questionnaireAnswered";
pub const EV_REGISTER_LOCATION: &str = "registerLocation";
pub const EV_REGISTER_TIMELINE_UPDATE: &str = "registerTimelineUpdate";
pub const EV_UNLOCK_ALL_TIMELINE: &str = "unlockAllTimelineLocations";
pub const EV_REGISTER_LOCATION_LIKE: &str = "registerLocationLike";
pub const EV_DISCONNECTED_FROM_EXHIBIT: &str = "disconnectedFromExhibit";
pub const EV_EXHIBIT_DISCONNECTED: &str = "exhibitDisconnectedFromExhibit";
pub const EV_DISCONNECT_USERS: &str = "disconnectUsers";
pub const EV_CHECK_LOCATION_STATUS: &str = "checkLocationStatus";
pub const EV_CHECK_USERNAME_EXISTS: &str = "checkUsernameExists";
pub const EV_CHECK_EMAIL_EXISTS: &str = "checkEmailExists";
pub const EV_CHECK_NAME_OR_EMAIL_EXISTS: &str = "checkNameOrEmailExists";
pub const EV_LOGIN_EXHIBIT: &str = "loginExhibit";
pub const EV_GET_WIFI_SSID: &str = "getWifiSSID";
pub const EV_UPDATE_LANGUAGE: &str = "updateUserLanguage";
pub const EV_CHANGE_CREDENTIALS: &str = "changeCredentials";
pub const EV_MAKE_GUEST_PERMANENT: &str = "makeGuestPermanent";
pub const EV_GET_VISITOR_COA_PARTS: &str = "getUserCoaParts";
pub const EV_GET_COA_PARTS: &str = "getCoaParts";
pub const EV_GET_COA_COLORS: &str = "getCoaColors";
pub const EV_CHANGE_COA_COLORS: &str = "changeUserCoaColors";
pub const EV_CHANGE_COA_PART: &str = "changeUserCoaPart";
pub const EV_UNLOCK_COA_PART: &str = "unlockCoaPart";
pub const EV_UNLOCK_COA_PART_FROM_EXHIBIT: &str = "unlockCoaPartFromExhibit";
pub const EV_UPDATE_SEAT: &str = "updateSeat";
pub const EV_GET_LOOKUP_TABLE: &str = "getLookupTable";
pub const EV_CHECK_APP_VERSION: &str = "checkAppVersion";
pub const EV_CHECK_DEVICE_DATA: &str = "checkUserDeviceData";
pub const EV_ADD_LOG_ENTRY: &str = "addUserLogEntry";

// Outbound pushes (Notifier side effects).
pub const PUSH_VISITOR_JOINED: &str = "visitorJoined";
pub const PUSH_OD_LEFT: &str = "odLeft";
pub const PUSH_KICKED_FROM_EXHIBIT: &str = "kickedFromExhibit";

/// Whether an event must carry a valid session token before dispatch.
///
/// The exempt set covers everything a client needs before it can own a
/// token (registration, logins, existence checks) and the kiosk-originated
/// administrative events, which authenticate by their socket binding.
pub fn token_required(event: &str) -> bool {
    !matches!(
        event,
        EV_ADD_TOKEN
            | EV_REGISTER_VISITOR
            | EV_REGISTER_GUEST
            | EV_LOGIN
            | EV_AUTO_LOGIN
            | EV_DISCONNECT_USERS
            | EV_EXHIBIT_DISCONNECTED
            | EV_CHECK_USERNAME_EXISTS
            | EV_CHECK_EMAIL_EXISTS
            | EV_CHECK_NAME_OR_EMAIL_EXISTS
            | EV_LOGIN_EXHIBIT
            | EV_UPDATE_SEAT
            | EV_UNLOCK_COA_PART_FROM_EXHIBIT
            | EV_GET_WIFI_SSID
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_event_appends_suffix() {
        assert_eq!(result_event(EV_REGISTER_LOCATION), "registerLocationResult");
    }

    #[test]
    fn pre_login_events_are_token_exempt() {
        for event in [
            EV_ADD_TOKEN,
            EV_REGISTER_VISITOR,
            EV_REGISTER_GUEST,
            EV_LOGIN,
            EV_AUTO_LOGIN,
            EV_LOGIN_EXHIBIT,
            EV_UPDATE_SEAT,
        ] {
            assert!(!token_required(event), "{event} must be exempt");
        }
        assert!(token_required(EV_REGISTER_LOCATION));
        assert!(token_required(EV_GET_LOOKUP_TABLE));
    }

    #[test]
    fn client_frame_parses_with_and_without_payload() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"event":"getCoaParts"}"#).expect("parse");
        assert_eq!(frame.event, "getCoaParts");
        assert!(frame.payload.is_null());

        let frame: ClientFrame = serde_json::from_str(
            r#"{"event":"registerLocation","payload":{"user":1,"location":101}}"#,
        )
        .expect("parse");
        assert_eq!(frame.payload["location"], 101);
    }
}
