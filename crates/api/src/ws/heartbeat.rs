//! Periodic ping task keeping idle connections alive through proxies.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ws::manager::SessionRegistry;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat loop. Aborted by the caller on shutdown.
pub fn start_heartbeat(sessions: Arc<SessionRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let pinged = sessions.ping_all().await;
            if pinged > 0 {
                tracing::trace!(connections = pinged, "Heartbeat pings sent");
            }
        }
    })
}
