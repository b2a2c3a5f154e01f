use super::{providers, ConditionFault, PolicyCondition};
use crate::config::ComponentSettings;
use client_policy_types::{ComponentRecord, ConditionVote, PolicyContext};
use std::collections::BTreeSet;

const SCOPES: &str = "scopes";

/// Applies when the request asks for one of the configured scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientScopesCondition {
    scopes: BTreeSet<String>,
}

impl ClientScopesCondition {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        Self::new(ComponentSettings::new(record).list(SCOPES))
    }
}

impl PolicyCondition for ClientScopesCondition {
    fn provider_id(&self) -> &'static str {
        providers::CLIENT_SCOPES
    }

    fn evaluate(&self, context: &PolicyContext) -> Result<ConditionVote, ConditionFault> {
        // Scopes only exist once a request is made
        let Some(params) = context.request_parameters() else {
            return Ok(ConditionVote::NotApplicable);
        };
        Ok(ConditionVote::from_match(
            params.scope.iter().any(|scope| self.scopes.contains(scope)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_policy_types::{ClientRepresentation, Realm, RequestParameters};

    fn request(scope: &str) -> PolicyContext {
        PolicyContext::authorization_request(
            Realm::new("test"),
            ClientRepresentation::new("app"),
            RequestParameters::new().with_scope(scope),
        )
    }

    #[test]
    fn test_scope_intersection() {
        let condition = ClientScopesCondition::new(["offline_access", "microprofile-jwt"]);
        assert_eq!(
            condition.evaluate(&request("openid microprofile-jwt")).unwrap(),
            ConditionVote::Applicable
        );
        assert_eq!(
            condition.evaluate(&request("openid profile")).unwrap(),
            ConditionVote::Deny
        );
    }

    #[test]
    fn test_registration_abstains() {
        let condition = ClientScopesCondition::new(["offline_access"]);
        let ctx = PolicyContext::register(Realm::new("test"), ClientRepresentation::new("app"));
        assert_eq!(condition.evaluate(&ctx).unwrap(), ConditionVote::NotApplicable);
    }
}
