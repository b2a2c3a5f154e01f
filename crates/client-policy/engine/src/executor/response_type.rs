use super::{providers, PolicyExecutor};
use crate::config::ComponentSettings;
use crate::error::PolicyViolation;
use client_policy_types::{ClientPolicyEvent, ComponentRecord, ExecutorOutcome, PolicyContext};

const ALLOWED_RESPONSE_TYPES: &str = "allowed-response-types";

/// Rejects authorization requests with non-recommended response types
///
/// Without an explicit allow-list only hybrid flows (`code` together with
/// `id_token`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecureResponseTypeExecutor {
    allowed: Option<Vec<String>>,
}

impl SecureResponseTypeExecutor {
    pub fn new(allowed: Option<Vec<String>>) -> Self {
        Self {
            allowed: allowed.map(|types| types.iter().map(|t| normalize(t)).collect()),
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        let allowed = ComponentSettings::new(record).list(ALLOWED_RESPONSE_TYPES);
        Self::new((!allowed.is_empty()).then_some(allowed))
    }

    fn is_allowed(&self, response_type: &str) -> bool {
        match &self.allowed {
            Some(allowed) => allowed.contains(&normalize(response_type)),
            None => {
                let values: Vec<&str> = response_type.split_whitespace().collect();
                values.contains(&"code") && values.contains(&"id_token")
            }
        }
    }
}

/// Sorted, single-space separated response type
fn normalize(response_type: &str) -> String {
    let mut values: Vec<&str> = response_type.split_whitespace().collect();
    values.sort_unstable();
    values.join(" ")
}

impl PolicyExecutor for SecureResponseTypeExecutor {
    fn provider_id(&self) -> &'static str {
        providers::SECURE_RESPONSE_TYPE_ENFORCE
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> Result<ExecutorOutcome, PolicyViolation> {
        if context.event() != ClientPolicyEvent::AuthorizationRequest {
            return Ok(ExecutorOutcome::Pass);
        }
        let Some(params) = context.request_parameters() else {
            return Ok(ExecutorOutcome::Pass);
        };

        let response_type = params
            .response_type
            .as_deref()
            .filter(|rt| !rt.trim().is_empty())
            .ok_or_else(|| PolicyViolation::missing_parameter("response_type"))?;

        if self.is_allowed(response_type) {
            Ok(ExecutorOutcome::Pass)
        } else {
            Err(PolicyViolation::invalid_request("invalid response_type"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_policy_types::{ClientRepresentation, Realm, RequestParameters};

    fn authorize(executor: &SecureResponseTypeExecutor, params: RequestParameters) -> Result<ExecutorOutcome, PolicyViolation> {
        let mut ctx = PolicyContext::authorization_request(
            Realm::new("test"),
            ClientRepresentation::new("app"),
            params,
        );
        executor.execute(&mut ctx)
    }

    #[test]
    fn test_default_requires_hybrid() {
        let executor = SecureResponseTypeExecutor::default();

        let err = authorize(&executor, RequestParameters::new()).unwrap_err();
        assert_eq!(err.error_description, "Missing parameter: response_type");

        for rejected in ["code", "token", "id_token token"] {
            let err = authorize(&executor, RequestParameters::new().with_response_type(rejected)).unwrap_err();
            assert_eq!(err.error_description, "invalid response_type");
        }

        for accepted in ["code id_token", "id_token code", "code id_token token"] {
            assert!(authorize(&executor, RequestParameters::new().with_response_type(accepted)).is_ok());
        }
    }

    #[test]
    fn test_allow_list_override() {
        let executor = SecureResponseTypeExecutor::new(Some(vec!["code".into(), "id_token  code".into()]));

        assert!(authorize(&executor, RequestParameters::new().with_response_type("code")).is_ok());
        assert!(authorize(&executor, RequestParameters::new().with_response_type("code id_token")).is_ok());
        assert!(authorize(&executor, RequestParameters::new().with_response_type("code id_token token")).is_err());
    }
}
