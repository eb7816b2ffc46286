//! Well-known event type names.

/// Visitor arrived at a location and engaged with it.
pub const LOCATION_VISITED: &str = "location.visited";

/// Visitor saw a location but declined the exhibit.
pub const LOCATION_DISMISSED: &str = "location.dismissed";

/// A timeline location transitioned from locked to unlocked.
pub const TIMELINE_UNLOCKED: &str = "timeline.unlocked";

/// A timeline update attempt that changed nothing.
pub const TIMELINE_ALREADY_SEEN: &str = "timeline.already_seen";

/// Visitor logged in with credentials.
pub const VISITOR_LOGIN: &str = "visitor.login";

/// Visitor was re-authenticated from a stored token.
pub const VISITOR_AUTO_LOGIN: &str = "visitor.auto_login";
