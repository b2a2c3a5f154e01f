//! Condition votes and executor outcomes

use serde::{Deserialize, Serialize};

/// Tri-state result of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionVote {
    /// The policy should run for this event
    Applicable,

    /// The condition has no opinion for this event
    NotApplicable,

    /// The condition disqualifies the policy for this request
    Deny,
}

impl ConditionVote {
    /// Vote `Applicable` when `matched`, `Deny` otherwise
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::Applicable
        } else {
            Self::Deny
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny)
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }
}

/// Successful result of an executor
///
/// Rejections are not outcomes: executors return a violation error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutorOutcome {
    /// No objection
    Pass,

    /// The proposed representation was rewritten
    Augmented,
}

impl ExecutorOutcome {
    pub fn is_augmented(&self) -> bool {
        matches!(self, Self::Augmented)
    }
}
