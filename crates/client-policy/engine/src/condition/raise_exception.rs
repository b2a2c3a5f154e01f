use super::{providers, ConditionFault, PolicyCondition};
use client_policy_types::{ConditionVote, PolicyContext};

/// Diagnostic condition that always faults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaiseExceptionCondition;

impl PolicyCondition for RaiseExceptionCondition {
    fn provider_id(&self) -> &'static str {
        providers::TEST_RAISE_EXCEPTION
    }

    fn evaluate(&self, context: &PolicyContext) -> Result<ConditionVote, ConditionFault> {
        Err(ConditionFault(format!(
            "intentional fault on {}",
            context.event()
        )))
    }
}
