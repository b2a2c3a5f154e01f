//! Condition providers
//!
//! A condition decides whether its policy applies to the current event by
//! voting `APPLICABLE`, `NOT_APPLICABLE` or `DENY`. Providers are resolved
//! by provider id into a closed set of kinds, each holding its typed
//! configuration decoded once when the policy is loaded.

mod access_type;
mod client_roles;
mod client_scopes;
mod ip_address;
mod raise_exception;
mod updating_source;

pub use access_type::ClientAccessTypeCondition;
pub use client_roles::ClientRolesCondition;
pub use client_scopes::ClientScopesCondition;
pub use ip_address::ClientIpAddressCondition;
pub use raise_exception::RaiseExceptionCondition;
pub use updating_source::{
    RegistrationSource, UpdatingSourceCondition, UpdatingSourceGroupsCondition,
    UpdatingSourceHostsCondition, UpdatingSourceRolesCondition,
};

use crate::error::{ClientPolicyError, Result};
use client_policy_types::{provider_type, ComponentRecord, ConditionVote, PolicyContext};
use thiserror::Error;

/// Provider ids of the known conditions
pub mod providers {
    pub const CLIENT_ROLES: &str = "client-roles";
    pub const CLIENT_SCOPES: &str = "client-scopes";
    pub const CLIENT_ACCESS_TYPE: &str = "client-access-type";
    pub const CLIENT_IP_ADDRESS: &str = "client-ip-address";
    pub const UPDATING_CLIENT_SOURCE: &str = "updating-client-source";
    pub const UPDATING_CLIENT_SOURCE_HOSTS: &str = "updating-client-source-hosts";
    pub const UPDATING_CLIENT_SOURCE_GROUPS: &str = "updating-client-source-groups";
    pub const UPDATING_CLIENT_SOURCE_ROLES: &str = "updating-client-source-roles";
    pub const TEST_RAISE_EXCEPTION: &str = "test-raise-exception";
}

/// Fault raised by a condition that could not evaluate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConditionFault(pub String);

/// Condition contract
pub trait PolicyCondition: Send + Sync + std::fmt::Debug {
    /// Provider id this condition was created from
    fn provider_id(&self) -> &'static str;

    /// Vote on the current event; must not mutate anything
    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault>;
}

/// Known condition kinds
#[derive(Debug, Clone)]
pub enum ConditionKind {
    ClientRoles(ClientRolesCondition),
    ClientScopes(ClientScopesCondition),
    ClientAccessType(ClientAccessTypeCondition),
    ClientIpAddress(ClientIpAddressCondition),
    UpdatingSource(UpdatingSourceCondition),
    UpdatingSourceHosts(UpdatingSourceHostsCondition),
    UpdatingSourceGroups(UpdatingSourceGroupsCondition),
    UpdatingSourceRoles(UpdatingSourceRolesCondition),
    RaiseException(RaiseExceptionCondition),
}

impl ConditionKind {
    /// Decode a condition kind from its component record
    pub fn from_component(record: &ComponentRecord) -> Result<Self> {
        let kind = match record.provider_id.as_str() {
            providers::CLIENT_ROLES => Self::ClientRoles(ClientRolesCondition::from_component(record)),
            providers::CLIENT_SCOPES => {
                Self::ClientScopes(ClientScopesCondition::from_component(record))
            }
            providers::CLIENT_ACCESS_TYPE => {
                Self::ClientAccessType(ClientAccessTypeCondition::from_component(record)?)
            }
            providers::CLIENT_IP_ADDRESS => {
                Self::ClientIpAddress(ClientIpAddressCondition::from_component(record)?)
            }
            providers::UPDATING_CLIENT_SOURCE => {
                Self::UpdatingSource(UpdatingSourceCondition::from_component(record)?)
            }
            providers::UPDATING_CLIENT_SOURCE_HOSTS => {
                Self::UpdatingSourceHosts(UpdatingSourceHostsCondition::from_component(record)?)
            }
            providers::UPDATING_CLIENT_SOURCE_GROUPS => {
                Self::UpdatingSourceGroups(UpdatingSourceGroupsCondition::from_component(record))
            }
            providers::UPDATING_CLIENT_SOURCE_ROLES => {
                Self::UpdatingSourceRoles(UpdatingSourceRolesCondition::from_component(record))
            }
            providers::TEST_RAISE_EXCEPTION => Self::RaiseException(RaiseExceptionCondition),
            other => {
                return Err(ClientPolicyError::configuration(
                    &record.name,
                    format!("unknown condition provider: {other}"),
                ))
            }
        };
        Ok(kind)
    }

    fn as_condition(&self) -> &dyn PolicyCondition {
        match self {
            Self::ClientRoles(c) => c,
            Self::ClientScopes(c) => c,
            Self::ClientAccessType(c) => c,
            Self::ClientIpAddress(c) => c,
            Self::UpdatingSource(c) => c,
            Self::UpdatingSourceHosts(c) => c,
            Self::UpdatingSourceGroups(c) => c,
            Self::UpdatingSourceRoles(c) => c,
            Self::RaiseException(c) => c,
        }
    }
}

impl PolicyCondition for ConditionKind {
    fn provider_id(&self) -> &'static str {
        self.as_condition().provider_id()
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        self.as_condition().evaluate(context)
    }
}

/// Condition instance referenced by a policy
#[derive(Debug, Clone)]
pub struct Condition {
    pub id: String,
    pub name: String,
    pub kind: ConditionKind,
}

impl Condition {
    /// Resolve a condition from its persisted record
    pub fn from_component(record: &ComponentRecord) -> Result<Self> {
        if record.provider_type != provider_type::CONDITION {
            return Err(ClientPolicyError::configuration(
                &record.name,
                format!("expected a condition, found {}", record.provider_type),
            ));
        }

        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: ConditionKind::from_component(record)?,
        })
    }

    /// Vote, turning a fault into a condition failure naming this instance
    pub fn evaluate(&self, context: &PolicyContext) -> Result<ConditionVote> {
        self.kind
            .evaluate(context)
            .map_err(|fault| ClientPolicyError::condition_failure(&self.name, fault.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_policy_types::{ClientRepresentation, Realm};

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let record = ComponentRecord::condition("Mystery", "test", "no-such-condition");
        let err = ConditionKind::from_component(&record).unwrap_err();
        assert!(matches!(err, ClientPolicyError::Configuration { ref component, .. } if component == "Mystery"));
    }

    #[test]
    fn test_executor_record_is_not_a_condition() {
        let record = ComponentRecord::executor("PKCEEnforceExecutor", "test", "pkce-enforce");
        assert!(Condition::from_component(&record).is_err());
    }

    #[test]
    fn test_fault_names_the_condition() {
        let record = ComponentRecord::condition(
            "TestRaiseExeptionCondition",
            "test",
            providers::TEST_RAISE_EXCEPTION,
        );
        let condition = Condition::from_component(&record).unwrap();
        let ctx = PolicyContext::register(Realm::new("test"), ClientRepresentation::new("app"));

        match condition.evaluate(&ctx) {
            Err(ClientPolicyError::ConditionFailure { condition, .. }) => {
                assert_eq!(condition, "TestRaiseExeptionCondition")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
