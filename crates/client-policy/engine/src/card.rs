//! Evaluation cards
//!
//! Every trigger produces an [`EvaluationCard`] recording which policies
//! were considered, how their conditions voted and what each executor did.

use crate::error::PolicyViolation;
use crate::policy::ConditionVoteRecord;
use chrono::{DateTime, Utc};
use client_policy_types::{ClientPolicyEvent, ExecutorOutcome};
use serde::{Deserialize, Serialize};

/// Outcome of a single executor run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorRecord {
    pub executor: String,
    pub outcome: ExecutorOutcome,
}

/// Record of a single policy evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEvaluationRecord {
    pub policy_id: String,

    pub policy_name: String,

    /// Whether the policy's executors ran
    pub active: bool,

    pub votes: Vec<ConditionVoteRecord>,

    pub executors: Vec<ExecutorRecord>,

    /// Rejection raised by one of the executors
    pub violation: Option<PolicyViolation>,

    /// Evaluation duration in microseconds
    pub duration_us: u64,
}

impl PolicyEvaluationRecord {
    pub fn new(policy_id: impl Into<String>, policy_name: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            policy_name: policy_name.into(),
            active: false,
            votes: Vec::new(),
            executors: Vec::new(),
            violation: None,
            duration_us: 0,
        }
    }

    pub fn was_augmented(&self) -> bool {
        self.executors.iter().any(|e| e.outcome.is_augmented())
    }
}

/// Audit card for one trigger call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCard {
    pub id: String,

    pub event: ClientPolicyEvent,

    pub realm: String,

    pub timestamp: DateTime<Utc>,

    pub policies_evaluated: Vec<PolicyEvaluationRecord>,

    /// Errors recovered during post-commit notifications
    pub diagnostics: Vec<String>,
}

impl EvaluationCard {
    pub fn new(event: ClientPolicyEvent, realm: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            realm: realm.into(),
            timestamp: Utc::now(),
            policies_evaluated: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_evaluation(&mut self, record: PolicyEvaluationRecord) {
        self.policies_evaluated.push(record);
    }

    pub fn add_diagnostic(&mut self, diagnostic: impl Into<String>) {
        self.diagnostics.push(diagnostic.into());
    }

    /// Names of the policies whose executors ran
    pub fn active_policies(&self) -> Vec<&str> {
        self.policies_evaluated
            .iter()
            .filter(|r| r.active)
            .map(|r| r.policy_name.as_str())
            .collect()
    }

    /// Whether any executor rewrote the proposed representation
    pub fn was_augmented(&self) -> bool {
        self.policies_evaluated.iter().any(|r| r.was_augmented())
    }

    /// Sequence of executor outcomes across all policies
    pub fn outcomes(&self) -> Vec<ExecutorOutcome> {
        self.policies_evaluated
            .iter()
            .flat_map(|r| r.executors.iter().map(|e| e.outcome))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_summaries() {
        let mut card = EvaluationCard::new(ClientPolicyEvent::ClientRegister, "test");
        assert!(!card.id.is_empty());
        assert!(!card.was_augmented());

        let mut inactive = PolicyEvaluationRecord::new("p1", "Inactive");
        inactive.duration_us = 12;
        card.add_evaluation(inactive);

        let mut active = PolicyEvaluationRecord::new("p2", "Active");
        active.active = true;
        active.executors.push(ExecutorRecord {
            executor: "PKCEEnforceExecutor".into(),
            outcome: ExecutorOutcome::Augmented,
        });
        card.add_evaluation(active);

        assert_eq!(card.active_policies(), ["Active"]);
        assert!(card.was_augmented());
        assert_eq!(card.outcomes(), [ExecutorOutcome::Augmented]);
    }
}
