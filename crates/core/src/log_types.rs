//! Well-known visit-log type codes.
//!
//! These must match the values the client apps send with `addUserLogEntry`
//! and the codes the analytics export expects. The set is open-ended on the
//! wire (clients may define new codes) so log entries store the raw integer.

/// Visitor arrived at a location and engaged with it.
pub const LOG_VISITED: i32 = 1;

/// Visitor saw a location but declined the exhibit; no seat admission.
pub const LOG_DISMISSED: i32 = 2;

/// A timeline location transitioned from locked to unlocked.
pub const LOG_TIMELINE_UNLOCKED: i32 = 3;

/// A timeline update attempt that changed nothing (already unlocked, or the
/// preceding location was still locked).
pub const LOG_TIMELINE_ALREADY_SEEN: i32 = 4;

/// Visitor logged in with credentials.
pub const LOG_USER_LOGIN: i32 = 5;

/// Visitor was re-authenticated from a stored token.
pub const LOG_AUTO_LOGIN: i32 = 6;
