//! Background capture of visit-related events into the analytics log.
//!
//! [`LogSink`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and appends a [`LogEntry`] for every event it can map
//! to a log type code. It runs as a long-lived background task and shuts
//! down when the bus sender is dropped.

use std::sync::Arc;

use curio_core::log_types;
use curio_store::models::LogEntry;
use curio_store::Store;
use tokio::sync::broadcast;

use crate::bus::GuideEvent;
use crate::names;

/// Background service that appends guide events to the visit log.
pub struct LogSink;

impl LogSink {
    /// Run the capture loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and logs
    /// every mappable event. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(store: Arc<Store>, mut receiver: broadcast::Receiver<GuideEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => Self::capture(&store, &event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Log sink lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, log sink shutting down");
                    break;
                }
            }
        }
    }

    async fn capture(store: &Store, event: &GuideEvent) {
        let Some(visitor_id) = event.visitor_id else {
            return;
        };
        let Some(log_type) = log_type_for(&event.event_type) else {
            return;
        };

        let comment = event
            .payload
            .get("comment")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        store
            .logs
            .append(LogEntry {
                visitor_id,
                log_type,
                location_id: event.location_id,
                comment,
                timestamp: event.timestamp,
            })
            .await;
    }
}

/// Map an event type name to its visit-log code. Events without a code
/// (connection lifecycle, pushes) are not logged.
fn log_type_for(event_type: &str) -> Option<i32> {
    match event_type {
        names::LOCATION_VISITED => Some(log_types::LOG_VISITED),
        names::LOCATION_DISMISSED => Some(log_types::LOG_DISMISSED),
        names::TIMELINE_UNLOCKED => Some(log_types::LOG_TIMELINE_UNLOCKED),
        names::TIMELINE_ALREADY_SEEN => Some(log_types::LOG_TIMELINE_ALREADY_SEEN),
        names::VISITOR_LOGIN => Some(log_types::LOG_USER_LOGIN),
        names::VISITOR_AUTO_LOGIN => Some(log_types::LOG_AUTO_LOGIN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn visited_event_lands_in_the_log() {
        let store = Arc::new(Store::seeded().expect("seeded store"));
        let bus = EventBus::default();
        let sink = tokio::spawn(LogSink::run(Arc::clone(&store), bus.subscribe()));

        bus.publish(
            GuideEvent::new(names::LOCATION_VISITED)
                .at_location(101)
                .by_visitor(3),
        );
        drop(bus);
        sink.await.expect("sink task");

        let entries = store.logs.for_visitor(3).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].log_type, log_types::LOG_VISITED);
        assert_eq!(entries[0].location_id, Some(101));
    }

    #[tokio::test]
    async fn anonymous_and_unmapped_events_are_skipped() {
        let store = Arc::new(Store::seeded().expect("seeded store"));
        let bus = EventBus::default();
        let sink = tokio::spawn(LogSink::run(Arc::clone(&store), bus.subscribe()));

        // No visitor attached.
        bus.publish(GuideEvent::new(names::LOCATION_VISITED).at_location(101));
        // No log code for this name.
        bus.publish(GuideEvent::new("session.opened").by_visitor(3));
        drop(bus);
        sink.await.expect("sink task");

        assert!(store.logs.is_empty().await);
    }
}
