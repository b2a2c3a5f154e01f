//! Policy manager
//!
//! Entry point for protocol-layer callers. Each `trigger` reads the realm's
//! current policies, evaluates their conditions and runs the executors of
//! the active ones, in persisted order.

use crate::card::{EvaluationCard, ExecutorRecord, PolicyEvaluationRecord};
use crate::config::EngineConfig;
use crate::error::{ClientPolicyError, Result};
use crate::policy::ClientPolicy;
use crate::protocol::ProtocolError;
use crate::registry::{ComponentStore, PolicyRegistry};
use client_policy_types::{ClientPolicyEvent, ExecutorOutcome, PolicyContext};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Evaluates client policies for lifecycle events
#[derive(Debug, Clone)]
pub struct ClientPolicyManager {
    registry: PolicyRegistry,
    config: EngineConfig,
}

impl ClientPolicyManager {
    pub fn new(store: Arc<dyn ComponentStore>, config: EngineConfig) -> Self {
        Self {
            registry: PolicyRegistry::new(store),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Protocol response for an error returned by [`trigger`](Self::trigger)
    pub fn protocol_error(&self, event: ClientPolicyEvent, err: &ClientPolicyError) -> ProtocolError {
        ProtocolError::for_event(event, err, self.config.expose_diagnostics)
    }

    /// Evaluate the realm's policies for the event carried by `context`
    ///
    /// On success the context holds any augmentation made to the proposed
    /// representation; persisting it is the caller's job. Errors raised
    /// while handling `CLIENT_REGISTERED` are recorded as diagnostics on the
    /// returned card instead.
    pub fn trigger(&self, context: &mut PolicyContext) -> Result<EvaluationCard> {
        let event = context.event();
        let realm = context.realm().name.clone();
        let mut card = EvaluationCard::new(event, &realm);

        if !self.config.enabled {
            debug!(realm = %realm, event = %event, "Client policies disabled");
            return Ok(card);
        }

        match self.evaluate(context, &mut card) {
            Ok(()) => {
                debug!(
                    realm = %realm,
                    event = %event,
                    policies = card.policies_evaluated.len(),
                    active = card.active_policies().len(),
                    "Client policies evaluated"
                );
                Ok(card)
            }
            Err(err) if event.is_post_commit() => {
                warn!(
                    realm = %realm,
                    event = %event,
                    error = %err,
                    "Client policy failure after commit ignored"
                );
                card.add_diagnostic(err.to_string());
                Ok(card)
            }
            Err(err) => {
                log_failure(&realm, event, &err);
                Err(err)
            }
        }
    }

    fn evaluate(&self, context: &mut PolicyContext, card: &mut EvaluationCard) -> Result<()> {
        let policies = self.registry.load(&context.realm().name)?;

        for policy in &policies {
            let start = Instant::now();
            let result = self.evaluate_policy(policy, context);
            let (mut record, outcome) = match result {
                Ok(record) => (record, Ok(())),
                Err((record, err)) => (record, Err(err)),
            };
            record.duration_us = micros(start.elapsed());
            card.add_evaluation(record);
            outcome?;
        }

        Ok(())
    }

    fn evaluate_policy(
        &self,
        policy: &ClientPolicy,
        context: &mut PolicyContext,
    ) -> std::result::Result<PolicyEvaluationRecord, (PolicyEvaluationRecord, ClientPolicyError)> {
        let mut record = PolicyEvaluationRecord::new(&policy.id, &policy.name);

        let activation = match policy.activation(context, self.config.abstention) {
            Ok(activation) => activation,
            Err(err) => return Err((record, err)),
        };
        record.active = activation.active;
        record.votes = activation.votes;

        if !record.active {
            debug!(policy = %policy.name, event = %context.event(), "Policy not active");
            return Ok(record);
        }

        for executor in policy.executors() {
            match executor.execute(context) {
                Ok(outcome) => {
                    if outcome == ExecutorOutcome::Augmented {
                        info!(
                            policy = %policy.name,
                            executor = %executor.name,
                            event = %context.event(),
                            "Proposed representation augmented"
                        );
                    } else {
                        debug!(policy = %policy.name, executor = %executor.name, "Executor passed");
                    }
                    record.executors.push(ExecutorRecord {
                        executor: executor.name.clone(),
                        outcome,
                    });
                }
                Err(violation) => {
                    warn!(
                        policy = %policy.name,
                        executor = %executor.name,
                        event = %context.event(),
                        error = %violation.error,
                        error_description = %violation.error_description,
                        "Client policy violation"
                    );
                    record.violation = Some(violation.clone());
                    return Err((record, violation.into()));
                }
            }
        }

        Ok(record)
    }
}

/// Whole microseconds, saturating at `u64::MAX`
fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

fn log_failure(realm: &str, event: ClientPolicyEvent, err: &ClientPolicyError) {
    match err {
        ClientPolicyError::Violation(_) => {}
        ClientPolicyError::ConditionFailure { .. } => {
            error!(realm = %realm, event = %event, error = %err, "Condition failed, rejecting request")
        }
        ClientPolicyError::Configuration { .. } | ClientPolicyError::Store(_) => {
            error!(realm = %realm, event = %event, error = %err, "Client policy configuration error")
        }
    }
}
