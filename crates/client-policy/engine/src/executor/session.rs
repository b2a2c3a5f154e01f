use super::{providers, PolicyExecutor};
use crate::error::PolicyViolation;
use client_policy_types::{
    ClientPolicyEvent, ExecutorOutcome, PolicyContext, RequestParameters, SCOPE_OPENID,
};

/// Requires replay protection on authorization requests
///
/// OpenID requests, and any flow returning an ID token from the
/// authorization endpoint, must carry a `nonce`; plain OAuth requests must
/// carry a `state`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecureSessionExecutor;

impl SecureSessionExecutor {
    fn check(params: &RequestParameters) -> Result<ExecutorOutcome, PolicyViolation> {
        let (parameter, value) =
            if params.has_scope(SCOPE_OPENID) || params.has_response_type("id_token") {
                ("nonce", &params.nonce)
            } else {
                ("state", &params.state)
            };

        match value.as_deref() {
            Some(v) if !v.is_empty() => Ok(ExecutorOutcome::Pass),
            _ => Err(PolicyViolation::missing_parameter(parameter)),
        }
    }
}

impl PolicyExecutor for SecureSessionExecutor {
    fn provider_id(&self) -> &'static str {
        providers::SECURE_SESSION_ENFORCE
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> Result<ExecutorOutcome, PolicyViolation> {
        match (context.event(), context.request_parameters()) {
            (ClientPolicyEvent::AuthorizationRequest, Some(params)) => Self::check(params),
            _ => Ok(ExecutorOutcome::Pass),
        }
    }
}
