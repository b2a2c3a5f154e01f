use super::{providers, PolicyExecutor};
use crate::config::ComponentSettings;
use crate::error::PolicyViolation;
use client_policy_types::{attributes, ComponentRecord, ExecutorOutcome, PolicyContext};

const ALLOWED_ALGORITHMS: &str = "allowed-algorithms";

/// Algorithms accepted when no allow-list is configured
pub const DEFAULT_ALLOWED_ALGORITHMS: [&str; 6] =
    ["PS256", "PS384", "PS512", "ES256", "ES384", "ES512"];

/// Rejects registrations declaring signature algorithms off the allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureSigningAlgorithmExecutor {
    allowed: Vec<String>,
}

impl Default for SecureSigningAlgorithmExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ALGORITHMS)
    }
}

impl SecureSigningAlgorithmExecutor {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        let allowed = ComponentSettings::new(record).list(ALLOWED_ALGORITHMS);
        if allowed.is_empty() {
            Self::default()
        } else {
            Self::new(allowed)
        }
    }

    fn is_allowed(&self, algorithm: &str) -> bool {
        self.allowed.iter().any(|a| a == algorithm)
    }
}

impl PolicyExecutor for SecureSigningAlgorithmExecutor {
    fn provider_id(&self) -> &'static str {
        providers::SECURE_SIGNING_ALGORITHM_ENFORCE
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> Result<ExecutorOutcome, PolicyViolation> {
        if !context.event().is_registration() {
            return Ok(ExecutorOutcome::Pass);
        }
        let Some(client) = context.proposed_representation() else {
            return Ok(ExecutorOutcome::Pass);
        };

        for attribute in attributes::SIGNATURE_ALGORITHMS {
            let declared = client.attribute(attribute);
            // Undeclared ID token algorithms fall back to the realm default
            let effective = match (attribute, declared) {
                (attributes::ID_TOKEN_SIGNED_RESPONSE_ALG, None) => {
                    Some(context.realm().default_signature_algorithm.as_str())
                }
                _ => declared,
            };

            if let Some(algorithm) = effective {
                if !self.is_allowed(algorithm) {
                    return Err(PolicyViolation::invalid_client_metadata(attribute));
                }
            }
        }

        Ok(ExecutorOutcome::Pass)
    }
}
