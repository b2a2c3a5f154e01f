//! Client policies and their activation rule

use crate::condition::Condition;
use crate::config::AbstentionMode;
use crate::error::{ClientPolicyError, Result};
use crate::executor::Executor;
use client_policy_types::{ComponentRecord, ConditionVote, PolicyContext, DEFAULT_POLICY_PROVIDER};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vote cast by one condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionVoteRecord {
    pub condition: String,
    pub vote: ConditionVote,
}

/// Result of evaluating a policy's conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub active: bool,

    /// Votes in declared order, up to the first `DENY`
    pub votes: Vec<ConditionVoteRecord>,
}

/// Named bundle of ordered conditions and executors
#[derive(Debug, Clone)]
pub struct ClientPolicy {
    pub id: String,
    pub name: String,
    conditions: Vec<Condition>,
    executors: Vec<Executor>,
}

impl ClientPolicy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        conditions: Vec<Condition>,
        executors: Vec<Executor>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions,
            executors,
        }
    }

    /// Check that a record is a policy this engine can load
    pub(crate) fn validate_record(record: &ComponentRecord) -> Result<()> {
        if !record.is_policy() {
            return Err(ClientPolicyError::configuration(
                &record.name,
                format!("expected a policy, found {}", record.provider_type),
            ));
        }
        if record.provider_id != DEFAULT_POLICY_PROVIDER {
            return Err(ClientPolicyError::configuration(
                &record.name,
                format!("unknown policy provider: {}", record.provider_id),
            ));
        }
        Ok(())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn executors(&self) -> &[Executor] {
        &self.executors
    }

    /// Evaluate conditions in declared order, stopping at the first `DENY`
    ///
    /// A policy without conditions is always active. Otherwise it is active
    /// when nothing denies and at least one condition votes `APPLICABLE`,
    /// or every condition abstains and `abstention` is `Active`.
    pub fn activation(
        &self,
        context: &PolicyContext,
        abstention: AbstentionMode,
    ) -> Result<Activation> {
        let mut votes = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            let vote = condition.evaluate(context)?;
            debug!(
                policy = %self.name,
                condition = %condition.name,
                vote = ?vote,
                "Condition evaluated"
            );
            votes.push(ConditionVoteRecord {
                condition: condition.name.clone(),
                vote,
            });

            if vote.is_deny() {
                return Ok(Activation {
                    active: false,
                    votes,
                });
            }
        }

        let active = votes.is_empty()
            || votes.iter().any(|v| v.vote == ConditionVote::Applicable)
            || abstention == AbstentionMode::Active;

        Ok(Activation { active, votes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionKind, ClientRolesCondition, ClientScopesCondition, RaiseExceptionCondition};
    use client_policy_types::{ClientRepresentation, Realm};

    fn condition(name: &str, kind: ConditionKind) -> Condition {
        Condition {
            id: name.to_string(),
            name: name.to_string(),
            kind,
        }
    }

    fn register(client: ClientRepresentation) -> PolicyContext {
        PolicyContext::register(Realm::new("test"), client)
    }

    #[test]
    fn test_no_conditions_is_active() {
        let policy = ClientPolicy::new("p", "MyPolicy", vec![], vec![]);
        let activation = policy
            .activation(&register(ClientRepresentation::new("app")), AbstentionMode::Inactive)
            .unwrap();
        assert!(activation.active);
        assert!(activation.votes.is_empty());
    }

    #[test]
    fn test_deny_short_circuits() {
        let policy = ClientPolicy::new(
            "p",
            "MyPolicy",
            vec![
                condition("roles", ConditionKind::ClientRoles(ClientRolesCondition::new(["sample-client-role"]))),
                condition("boom", ConditionKind::RaiseException(RaiseExceptionCondition)),
            ],
            vec![],
        );

        let activation = policy
            .activation(&register(ClientRepresentation::new("app")), AbstentionMode::Active)
            .unwrap();
        assert!(!activation.active);
        assert_eq!(activation.votes.len(), 1);
        assert_eq!(activation.votes[0].vote, ConditionVote::Deny);
    }

    #[test]
    fn test_abstention_modes() {
        let policy = ClientPolicy::new(
            "p",
            "MyPolicy",
            vec![condition("scopes", ConditionKind::ClientScopes(ClientScopesCondition::new(["offline_access"])))],
            vec![],
        );
        let ctx = register(ClientRepresentation::new("app"));

        assert!(policy.activation(&ctx, AbstentionMode::Active).unwrap().active);
        assert!(!policy.activation(&ctx, AbstentionMode::Inactive).unwrap().active);
    }

    #[test]
    fn test_fault_propagates() {
        let policy = ClientPolicy::new(
            "p",
            "MyPolicy",
            vec![condition("boom", ConditionKind::RaiseException(RaiseExceptionCondition))],
            vec![],
        );
        let err = policy
            .activation(&register(ClientRepresentation::new("app")), AbstentionMode::Active)
            .unwrap_err();
        assert!(matches!(err, ClientPolicyError::ConditionFailure { .. }));
    }
}
