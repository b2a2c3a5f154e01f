use super::{providers, ConditionFault, PolicyCondition};
use crate::config::ComponentSettings;
use crate::error::Result;
use client_policy_types::{AccessType, ComponentRecord, ConditionVote, PolicyContext};
use std::collections::BTreeSet;

const TYPE: &str = "type";

/// Applies when the bound client's access type is in the allow-set
///
/// An empty configuration defaults to confidential clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAccessTypeCondition {
    types: BTreeSet<AccessType>,
}

impl ClientAccessTypeCondition {
    pub fn new(types: impl IntoIterator<Item = AccessType>) -> Self {
        let mut types: BTreeSet<AccessType> = types.into_iter().collect();
        if types.is_empty() {
            types.insert(AccessType::Confidential);
        }
        Self { types }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        let settings = ComponentSettings::new(record);
        let types = settings
            .list(TYPE)
            .iter()
            .map(|value| {
                AccessType::parse(value)
                    .ok_or_else(|| settings.invalid(format!("unknown access type: {value}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(types))
    }
}

impl PolicyCondition for ClientAccessTypeCondition {
    fn provider_id(&self) -> &'static str {
        providers::CLIENT_ACCESS_TYPE
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        let Some(client) = context.bound_client() else {
            return Ok(ConditionVote::NotApplicable);
        };
        Ok(ConditionVote::from_match(
            self.types.contains(&client.access_type()),
        ))
    }
}
