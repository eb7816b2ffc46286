//! Visitor records with runtime-assigned ids and uniqueness rules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use curio_core::error::CoreError;
use curio_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::{NewVisitor, Visitor};

pub struct VisitorStore {
    visitors: RwLock<HashMap<DbId, Visitor>>,
    next_id: AtomicI64,
}

impl VisitorStore {
    pub fn new() -> Self {
        Self {
            visitors: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a new visitor, enforcing name uniqueness and (for non-deleted
    /// accounts) email uniqueness.
    pub async fn create(&self, input: NewVisitor) -> Result<Visitor, CoreError> {
        let mut map = self.visitors.write().await;

        if map.values().any(|v| v.name == input.name) {
            return Err(CoreError::Conflict("Username is already existing!".into()));
        }
        if let Some(email) = &input.email {
            if map.values().any(|v| !v.is_deleted && v.email.as_ref() == Some(email)) {
                return Err(CoreError::Conflict("Email is already existing!".into()));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let visitor = Visitor {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            is_guest: input.is_guest,
            is_deleted: false,
            current_location: None,
            socket_id: input.socket_id,
            content_language: input.content_language,
            device_address: input.device_address,
            device_os: input.device_os,
            device_version: input.device_version,
            device_model: input.device_model,
            answered_questionnaire: false,
            primary_color: None,
            secondary_color: None,
            created_at: chrono::Utc::now(),
        };
        map.insert(id, visitor.clone());
        Ok(visitor)
    }

    pub async fn get(&self, id: DbId) -> Result<Visitor, CoreError> {
        self.visitors
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "visitor",
                id,
            })
    }

    /// Atomic read-modify-write on one visitor.
    pub async fn update<T>(
        &self,
        id: DbId,
        f: impl FnOnce(&mut Visitor) -> T,
    ) -> Result<T, CoreError> {
        let mut map = self.visitors.write().await;
        match map.get_mut(&id) {
            Some(visitor) => Ok(f(visitor)),
            None => Err(CoreError::NotFound {
                entity: "visitor",
                id,
            }),
        }
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Visitor> {
        self.visitors
            .read()
            .await
            .values()
            .find(|v| v.name == name && !v.is_deleted)
            .cloned()
    }

    pub async fn name_exists(&self, name: &str) -> bool {
        self.visitors.read().await.values().any(|v| v.name == name)
    }

    pub async fn email_exists(&self, email: &str) -> bool {
        self.visitors
            .read()
            .await
            .values()
            .any(|v| !v.is_deleted && v.email.as_deref() == Some(email))
    }

    /// Soft delete: the record and its log history stay.
    pub async fn soft_delete(&self, id: DbId) -> Result<(), CoreError> {
        self.update(id, |v| v.is_deleted = true).await
    }
}

impl Default for VisitorStore {
    fn default() -> Self {
        Self::new()
    }
}
