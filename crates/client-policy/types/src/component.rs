//! Generic component records
//!
//! Policies, conditions and executors are persisted by the admin store as
//! named components holding a provider id and a multi-valued string map.
//! The engine only reads these records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider types of the persisted components
pub mod provider_type {
    pub const POLICY: &str = "client-policy";
    pub const CONDITION: &str = "client-policy-condition";
    pub const EXECUTOR: &str = "client-policy-executor";
}

/// Policy configuration keys
pub mod policy_keys {
    /// Ordered condition component ids
    pub const CONDITION_IDS: &str = "conditionIds";
    /// Ordered executor component ids
    pub const EXECUTOR_IDS: &str = "executorIds";
}

/// Provider id of the default policy provider
pub const DEFAULT_POLICY_PROVIDER: &str = "client-policy";

/// String-keyed multi-valued configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentConfig(BTreeMap<String, Vec<String>>);

impl ComponentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// All values of a key
    pub fn get(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First non-empty value of a key
    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Replace all values of a key
    pub fn put(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), values);
    }

    /// Replace a key with a single value
    pub fn put_single(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Append a value to a key
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Remove a value from a key, returning whether it was present
    pub fn remove_value(&mut self, key: &str, value: &str) -> bool {
        match self.0.get_mut(key) {
            Some(values) => {
                let before = values.len();
                values.retain(|v| v != value);
                values.len() < before
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ComponentConfig
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// Persisted component record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Owning realm
    pub parent_id: String,

    pub provider_id: String,

    pub provider_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    #[serde(default)]
    pub config: ComponentConfig,
}

impl ComponentRecord {
    /// Create a record without an id; the store assigns one
    pub fn new(
        name: impl Into<String>,
        realm: impl Into<String>,
        provider_id: impl Into<String>,
        provider_type: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            parent_id: realm.into(),
            provider_id: provider_id.into(),
            provider_type: provider_type.into(),
            sub_type: None,
            config: ComponentConfig::new(),
        }
    }

    /// Policy record with empty condition and executor lists
    pub fn policy(name: impl Into<String>, realm: impl Into<String>) -> Self {
        Self::new(name, realm, DEFAULT_POLICY_PROVIDER, provider_type::POLICY)
    }

    pub fn condition(
        name: impl Into<String>,
        realm: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self::new(name, realm, provider_id, provider_type::CONDITION)
    }

    pub fn executor(
        name: impl Into<String>,
        realm: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self::new(name, realm, provider_id, provider_type::EXECUTOR)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set a multi-valued configuration entry
    pub fn with_config<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .put(key, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_policy(&self) -> bool {
        self.provider_type == provider_type::POLICY
    }

    /// Ordered condition ids of a policy record
    pub fn condition_ids(&self) -> &[String] {
        self.config.get(policy_keys::CONDITION_IDS)
    }

    /// Ordered executor ids of a policy record
    pub fn executor_ids(&self) -> &[String] {
        self.config.get(policy_keys::EXECUTOR_IDS)
    }
}
