//! The uniform result envelope every guide operation returns.
//!
//! A result is `{ data, message: { code, text } }`. The code taxonomy is a
//! small integer set the client apps already interpret: anything `<= 299`
//! counts as success, `304` is a legitimate no-op, everything above is a
//! failure kind. The envelope crosses the session gateway unchanged.

use serde::Serialize;

use crate::error::CoreError;

/// Success: read-only operation completed.
pub const CODE_OK: u16 = 200;
/// Success: a record was created.
pub const CODE_CREATED: u16 = 201;
/// Success: a record was updated.
pub const CODE_UPDATED: u16 = 202;
/// Success: credentials accepted, session bound.
pub const CODE_LOGGED_IN: u16 = 203;
/// Legitimate no-op: duplicate arrival, already-free station, full station,
/// unlock precondition unmet.
pub const CODE_NOT_MODIFIED: u16 = 304;
/// A required field was missing or malformed.
pub const CODE_INVALID_REQUEST: u16 = 400;
/// Credentials rejected.
pub const CODE_LOGIN_FAILED: u16 = 401;
/// The supplied token failed verification.
pub const CODE_INVALID_TOKEN: u16 = 403;
/// A referenced record does not exist.
pub const CODE_NOT_FOUND: u16 = 404;
/// A uniqueness rule was violated (name or email already taken).
pub const CODE_CONFLICT: u16 = 409;
/// The storage layer failed; always surfaced, never swallowed.
pub const CODE_STORAGE_FAILURE: u16 = 500;

/// Machine code plus human-readable text.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub code: u16,
    pub text: String,
}

impl Message {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Whether this code counts as success for the client apps.
    pub fn is_success(&self) -> bool {
        self.code <= 299
    }
}

/// Uniform operation result: optional payload plus a [`Message`].
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub data: Option<T>,
    pub message: Message,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, text: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Message::new(CODE_OK, text),
        }
    }

    pub fn created(data: T, text: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Message::new(CODE_CREATED, text),
        }
    }

    pub fn updated(data: T, text: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Message::new(CODE_UPDATED, text),
        }
    }

    pub fn logged_in(data: T, text: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Message::new(CODE_LOGGED_IN, text),
        }
    }

    pub fn not_modified(text: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Message::new(CODE_NOT_MODIFIED, text),
        }
    }

    pub fn failure(code: u16, text: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Message::new(code, text),
        }
    }
}

impl<T: Serialize> From<CoreError> for Envelope<T> {
    /// Map a domain error onto the envelope taxonomy. The inner message is
    /// already the client-facing text, so it travels without the `Display`
    /// taxonomy prefix. Storage failures are logged by the caller before
    /// conversion.
    fn from(err: CoreError) -> Self {
        let (code, text) = match err {
            CoreError::NotFound { entity, id } => {
                (CODE_NOT_FOUND, format!("Entity not found: {entity} with id {id}"))
            }
            CoreError::InvalidRequest(text) => (CODE_INVALID_REQUEST, text),
            CoreError::Conflict(text) => (CODE_CONFLICT, text),
            CoreError::Unauthorized(text) => (CODE_LOGIN_FAILED, text),
            CoreError::Storage(text) => (CODE_STORAGE_FAILURE, text),
        };
        Envelope::failure(code, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_codes_are_at_most_299() {
        for code in [CODE_OK, CODE_CREATED, CODE_UPDATED, CODE_LOGGED_IN] {
            assert!(Message::new(code, "x").is_success());
        }
    }

    #[test]
    fn not_modified_is_not_success() {
        assert!(!Message::new(CODE_NOT_MODIFIED, "no-op").is_success());
    }

    #[test]
    fn not_found_error_maps_to_404() {
        let env: Envelope<()> = CoreError::NotFound {
            entity: "location",
            id: 99,
        }
        .into();
        assert_eq!(env.message.code, CODE_NOT_FOUND);
        assert!(env.data.is_none());
    }

    #[test]
    fn conflict_error_text_stays_client_facing() {
        let env: Envelope<()> = CoreError::Conflict("Username is already existing!".into()).into();
        assert_eq!(env.message.code, CODE_CONFLICT);
        assert_eq!(env.message.text, "Username is already existing!");

        let env: Envelope<()> =
            CoreError::Unauthorized("Credentials are not matching!".into()).into();
        assert_eq!(env.message.code, CODE_LOGIN_FAILED);
        assert_eq!(env.message.text, "Credentials are not matching!");
    }

    #[test]
    fn envelope_serializes_with_data_and_message() {
        let env = Envelope::ok(vec![1, 2, 3], "found");
        let json = serde_json::to_value(&env).expect("serialize");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["message"]["code"], 200);
        assert_eq!(json["message"]["text"], "found");
    }
}
