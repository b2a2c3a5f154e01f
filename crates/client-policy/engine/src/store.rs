//! In-memory component store
//!
//! Suitable for tests and for hosts that embed the engine without a
//! persistent admin backend.

use crate::error::StoreError;
use crate::registry::ComponentStore;
use client_policy_types::{provider_type, ComponentRecord};
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Insertion-ordered component store
#[derive(Debug, Default)]
pub struct InMemoryComponentStore {
    components: RwLock<Vec<ComponentRecord>>,
}

impl InMemoryComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, assigning an id when it has none
    pub fn add(&self, mut record: ComponentRecord) -> Result<String, StoreError> {
        let mut components = self.components.write().map_err(|_| StoreError::Lock)?;

        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        } else if components.iter().any(|c| c.id == record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }

        debug!(
            id = %record.id,
            name = %record.name,
            provider_id = %record.provider_id,
            "Component added"
        );
        let id = record.id.clone();
        components.push(record);
        Ok(id)
    }

    /// Replace a component in place, keeping its position
    pub fn update(&self, record: ComponentRecord) -> Result<(), StoreError> {
        let mut components = self.components.write().map_err(|_| StoreError::Lock)?;
        let slot = components
            .iter_mut()
            .find(|c| c.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        *slot = record;
        Ok(())
    }

    /// Remove a component; references to it from policies are left dangling
    pub fn remove(&self, id: &str) -> Result<ComponentRecord, StoreError> {
        let mut components = self.components.write().map_err(|_| StoreError::Lock)?;
        let index = components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(components.remove(index))
    }

    pub fn len(&self) -> usize {
        self.components.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComponentStore for InMemoryComponentStore {
    fn list_policies(&self, realm: &str) -> Result<Vec<ComponentRecord>, StoreError> {
        let components = self.components.read().map_err(|_| StoreError::Lock)?;
        Ok(components
            .iter()
            .filter(|c| c.parent_id == realm && c.provider_type == provider_type::POLICY)
            .cloned()
            .collect())
    }

    fn get_component(&self, realm: &str, id: &str) -> Result<Option<ComponentRecord>, StoreError> {
        let components = self.components.read().map_err(|_| StoreError::Lock)?;
        Ok(components
            .iter()
            .find(|c| c.parent_id == realm && c.id == id)
            .cloned())
    }

    fn find_component(
        &self,
        realm: &str,
        provider_type: &str,
        name: &str,
    ) -> Result<Option<ComponentRecord>, StoreError> {
        let components = self.components.read().map_err(|_| StoreError::Lock)?;
        Ok(components
            .iter()
            .find(|c| c.parent_id == realm && c.provider_type == provider_type && c.name == name)
            .cloned())
    }
}
