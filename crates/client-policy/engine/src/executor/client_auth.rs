//! Client authentication method enforcement

use super::{providers, PolicyExecutor, IS_AUGMENT};
use crate::config::ComponentSettings;
use crate::error::{PolicyViolation, Result};
use client_policy_types::{authenticator, ComponentRecord, ExecutorOutcome, PolicyContext};
use tracing::info;

const CLIENT_AUTHNS: &str = "client-authns";
const CLIENT_AUTHNS_AUGMENT: &str = "client-authns-augment";

/// Restricts the client authenticator to an accepted set
///
/// In augment mode the proposed authenticator is overwritten with the
/// configured method instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureClientAuthExecutor {
    accepted: Vec<String>,
    augment: Option<String>,
}

impl SecureClientAuthExecutor {
    pub fn new<I, S>(accepted: I, augment: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: accepted.into_iter().map(Into::into).collect(),
            augment,
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        let settings = ComponentSettings::new(record);
        let accepted = settings.list(CLIENT_AUTHNS);
        if accepted.is_empty() {
            return Err(settings.invalid(format!("{CLIENT_AUTHNS} must not be empty")));
        }

        let augment = if settings.flag(IS_AUGMENT)? {
            let method = settings.first(CLIENT_AUTHNS_AUGMENT).ok_or_else(|| {
                settings.invalid(format!("{IS_AUGMENT} requires {CLIENT_AUTHNS_AUGMENT}"))
            })?;
            if !accepted.contains(&method) {
                return Err(settings.invalid(format!(
                    "augment method {method} is not an accepted authenticator"
                )));
            }
            Some(method)
        } else {
            None
        };

        Ok(Self::new(accepted, augment))
    }

    pub fn accepts(&self, authenticator: &str) -> bool {
        self.accepted.iter().any(|a| a == authenticator)
    }
}

impl PolicyExecutor for SecureClientAuthExecutor {
    fn provider_id(&self) -> &'static str {
        providers::SECURE_CLIENT_AUTHN_ENFORCE
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        if !context.event().is_registration() {
            return Ok(ExecutorOutcome::Pass);
        }
        // An update that leaves the authenticator unset keeps the stored one
        let stored = context
            .registered_client()
            .and_then(|client| client.client_authenticator_type.clone());
        let Some(client) = context.proposed_representation_mut() else {
            return Ok(ExecutorOutcome::Pass);
        };
        let current = client
            .client_authenticator_type
            .clone()
            .or(stored)
            .unwrap_or_else(|| authenticator::CLIENT_SECRET.to_string());

        match &self.augment {
            Some(method) if &current != method => {
                info!(
                    client_id = %client.client_id,
                    from = %current,
                    to = %method,
                    "Forcing client authenticator"
                );
                client.client_authenticator_type = Some(method.clone());
                Ok(ExecutorOutcome::Augmented)
            }
            Some(_) => Ok(ExecutorOutcome::Pass),
            None if self.accepts(&current) => Ok(ExecutorOutcome::Pass),
            None => Err(PolicyViolation::invalid_client_metadata(
                "token_endpoint_auth_method",
            )),
        }
    }
}
