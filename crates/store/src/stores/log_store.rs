//! Append-only visit/analytics log.

use curio_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::LogEntry;

pub struct LogStore {
    entries: RwLock<Vec<LogEntry>>,
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub async fn append(&self, entry: LogEntry) {
        self.entries.write().await.push(entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// One visitor's entries in append order; analytics export and tests.
    pub async fn for_visitor(&self, visitor_id: DbId) -> Vec<LogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.visitor_id == visitor_id)
            .cloned()
            .collect()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}
