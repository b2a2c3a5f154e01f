//! Policy registry
//!
//! Resolves the realm's persisted policy components into executable
//! [`ClientPolicy`] values. Nothing is cached: every call reads the store,
//! so an admin edit is visible to the very next evaluation.

use crate::condition::Condition;
use crate::error::{ClientPolicyError, Result, StoreError};
use crate::executor::Executor;
use crate::policy::ClientPolicy;
use client_policy_types::{provider_type, ComponentRecord};
use std::sync::Arc;
use tracing::{debug, error};

/// Read boundary of the external component store
pub trait ComponentStore: Send + Sync {
    /// Policy components of a realm in persisted order
    fn list_policies(&self, realm: &str) -> std::result::Result<Vec<ComponentRecord>, StoreError>;

    /// Component by id
    fn get_component(
        &self,
        realm: &str,
        id: &str,
    ) -> std::result::Result<Option<ComponentRecord>, StoreError>;

    /// Component by provider type and name
    fn find_component(
        &self,
        realm: &str,
        provider_type: &str,
        name: &str,
    ) -> std::result::Result<Option<ComponentRecord>, StoreError>;
}

/// Loads policies from a [`ComponentStore`]
#[derive(Clone)]
pub struct PolicyRegistry {
    store: Arc<dyn ComponentStore>,
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry").finish_non_exhaustive()
    }
}

impl PolicyRegistry {
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }

    /// Load the realm's current policies
    pub fn load(&self, realm: &str) -> Result<Vec<ClientPolicy>> {
        let records = self.store.list_policies(realm)?;
        debug!(realm = %realm, count = records.len(), "Loaded policy records");

        records
            .iter()
            .map(|record| self.resolve(realm, record))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| error!(realm = %realm, error = %e, "Failed to load client policies"))
    }

    /// Load a single policy by name
    pub fn find_policy(&self, realm: &str, name: &str) -> Result<Option<ClientPolicy>> {
        match self.store.find_component(realm, provider_type::POLICY, name)? {
            Some(record) => self.resolve(realm, &record).map(Some),
            None => Ok(None),
        }
    }

    fn resolve(&self, realm: &str, record: &ComponentRecord) -> Result<ClientPolicy> {
        ClientPolicy::validate_record(record)?;

        let conditions = record
            .condition_ids()
            .iter()
            .map(|id| Condition::from_component(&self.component(realm, record, id)?))
            .collect::<Result<Vec<_>>>()?;

        let executors = record
            .executor_ids()
            .iter()
            .map(|id| Executor::from_component(&self.component(realm, record, id)?))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClientPolicy::new(
            record.id.clone(),
            record.name.clone(),
            conditions,
            executors,
        ))
    }

    fn component(&self, realm: &str, policy: &ComponentRecord, id: &str) -> Result<ComponentRecord> {
        self.store.get_component(realm, id)?.ok_or_else(|| {
            ClientPolicyError::configuration(
                &policy.name,
                format!("references missing component {id}"),
            )
        })
    }
}
