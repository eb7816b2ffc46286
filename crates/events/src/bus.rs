//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`GuideEvent`]s.
//! It is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use curio_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// GuideEvent
// ---------------------------------------------------------------------------

/// A domain event inside the guide backend.
///
/// Constructed via [`GuideEvent::new`] and enriched with the builder
/// methods [`at_location`](GuideEvent::at_location),
/// [`by_visitor`](GuideEvent::by_visitor), and
/// [`with_payload`](GuideEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideEvent {
    /// Dot-separated event name, e.g. `"timeline.unlocked"`.
    pub event_type: String,

    /// Location the event concerns, if any.
    pub location_id: Option<DbId>,

    /// Visitor that triggered the event, if any.
    pub visitor_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl GuideEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            location_id: None,
            visitor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn at_location(mut self, location_id: DbId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn by_visitor(mut self, visitor_id: DbId) -> Self {
        self.visitor_id = Some(visitor_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`GuideEvent`].
pub struct EventBus {
    sender: broadcast::Sender<GuideEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// analytics capture is best-effort.
    pub fn publish(&self, event: GuideEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<GuideEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
