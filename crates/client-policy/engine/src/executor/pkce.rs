//! PKCE enforcement (RFC 7636)

use super::{providers, PolicyExecutor, IS_AUGMENT};
use crate::config::ComponentSettings;
use crate::error::{PolicyViolation, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use client_policy_types::{
    ClientPolicyEvent, ComponentRecord, ExecutorOutcome, PolicyContext, RequestParameters,
    PKCE_METHOD_S256,
};
use sha2::{Digest, Sha256};
use tracing::debug;

const PKCE_METHOD_PLAIN: &str = "plain";

/// Requires S256 PKCE on registrations and authorization code flows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PkceEnforceExecutor {
    augment: bool,
}

impl PkceEnforceExecutor {
    pub fn new(augment: bool) -> Self {
        Self { augment }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        Ok(Self::new(ComponentSettings::new(record).flag(IS_AUGMENT)?))
    }

    fn check_registration(
        &self,
        context: &mut PolicyContext,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        let Some(client) = context.proposed_representation_mut() else {
            return Ok(ExecutorOutcome::Pass);
        };

        if client.pkce_code_challenge_method() == Some(PKCE_METHOD_S256) {
            return Ok(ExecutorOutcome::Pass);
        }

        if self.augment {
            client.set_pkce_code_challenge_method(Some(PKCE_METHOD_S256));
            return Ok(ExecutorOutcome::Augmented);
        }

        Err(PolicyViolation::invalid_client_metadata("code_challenge_method"))
    }

    fn check_authorization(
        params: &RequestParameters,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        let method = non_empty(&params.code_challenge_method)
            .ok_or_else(|| PolicyViolation::missing_parameter("code_challenge_method"))?;
        if method != PKCE_METHOD_S256 {
            return Err(PolicyViolation::invalid_parameter("code_challenge_method"));
        }

        let challenge = non_empty(&params.code_challenge)
            .ok_or_else(|| PolicyViolation::missing_parameter("code_challenge"))?;
        if !is_valid_code(challenge) {
            return Err(PolicyViolation::invalid_parameter("code_challenge"));
        }

        Ok(ExecutorOutcome::Pass)
    }

    fn check_token(
        params: &RequestParameters,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        let verifier = non_empty(&params.code_verifier)
            .ok_or_else(|| PolicyViolation::invalid_grant("PKCE code verifier not specified"))?;
        if !is_valid_code(verifier) {
            return Err(PolicyViolation::invalid_grant("PKCE invalid code verifier"));
        }

        if let Some(issued) = non_empty(&params.issued_code_challenge) {
            let computed = match params.issued_code_challenge_method.as_deref() {
                Some(PKCE_METHOD_PLAIN) => verifier.to_string(),
                _ => s256_challenge(verifier),
            };
            if computed != issued {
                return Err(PolicyViolation::invalid_grant(
                    "PKCE verification failed: code verifier mismatch",
                ));
            }
        }

        Ok(ExecutorOutcome::Pass)
    }
}

impl PolicyExecutor for PkceEnforceExecutor {
    fn provider_id(&self) -> &'static str {
        providers::PKCE_ENFORCE
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        match context.event() {
            ClientPolicyEvent::ClientRegister | ClientPolicyEvent::ClientUpdate => {
                self.check_registration(context)
            }
            ClientPolicyEvent::AuthorizationRequest => match context.request_parameters() {
                Some(params) => Self::check_authorization(params),
                None => Ok(ExecutorOutcome::Pass),
            },
            ClientPolicyEvent::TokenRequest => match context.request_parameters() {
                Some(params) => Self::check_token(params),
                None => Ok(ExecutorOutcome::Pass),
            },
            event => {
                debug!(%event, "PKCE enforcement not applicable");
                Ok(ExecutorOutcome::Pass)
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// 43 to 128 unreserved characters
fn is_valid_code(value: &str) -> bool {
    (43..=128).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// `BASE64URL(SHA256(verifier))`
pub fn s256_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
