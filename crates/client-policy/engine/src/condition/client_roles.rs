use super::{providers, ConditionFault, PolicyCondition};
use crate::config::ComponentSettings;
use client_policy_types::{ComponentRecord, ConditionVote, PolicyContext};
use std::collections::BTreeSet;

const ROLES: &str = "roles";

/// Applies when the bound client holds one of the configured roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRolesCondition {
    roles: BTreeSet<String>,
}

impl ClientRolesCondition {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        Self::new(ComponentSettings::new(record).list(ROLES))
    }
}

impl PolicyCondition for ClientRolesCondition {
    fn provider_id(&self) -> &'static str {
        providers::CLIENT_ROLES
    }

    fn evaluate(&self, context: &PolicyContext) -> Result<ConditionVote, ConditionFault> {
        let Some(client) = context.bound_client() else {
            return Ok(ConditionVote::NotApplicable);
        };
        Ok(ConditionVote::from_match(
            self.roles.iter().any(|role| client.has_role(role)),
        ))
    }
}
