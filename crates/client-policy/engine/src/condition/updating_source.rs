//! Conditions on how a registration or update request is authenticated
//!
//! They only vote on `CLIENT_REGISTER` and `CLIENT_UPDATE`; every other
//! event gets `NOT_APPLICABLE`.

use super::{providers, ConditionFault, PolicyCondition};
use crate::config::ComponentSettings;
use crate::error::Result;
use client_policy_types::{ComponentRecord, ConditionVote, PolicyContext, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const UPDATE_CLIENT_SOURCE: &str = "update-client-source";
const TRUSTED_HOSTS: &str = "trusted-hosts";
const GROUPS: &str = "groups";
const ROLES: &str = "roles";

/// Authentication of a registration or update request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegistrationSource {
    /// End-user access token
    ByAuthenticatedUser,

    /// No token at all
    ByAnonymous,

    /// One-time initial access token
    ByInitialAccessToken,

    /// Registration access token issued earlier for the client
    ByRegistrationAccessToken,
}

impl RegistrationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByAuthenticatedUser => "ByAuthenticatedUser",
            Self::ByAnonymous => "ByAnonymous",
            Self::ByInitialAccessToken => "ByInitialAccessToken",
            Self::ByRegistrationAccessToken => "ByRegistrationAccessToken",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ByAuthenticatedUser" => Some(Self::ByAuthenticatedUser),
            "ByAnonymous" => Some(Self::ByAnonymous),
            "ByInitialAccessToken" => Some(Self::ByInitialAccessToken),
            "ByRegistrationAccessToken" => Some(Self::ByRegistrationAccessToken),
            _ => None,
        }
    }

    /// Classify the token presented with the request
    pub fn classify(context: &PolicyContext) -> Self {
        match context.token().map(|token| token.kind) {
            None => Self::ByAnonymous,
            Some(TokenKind::InitialAccess) => Self::ByInitialAccessToken,
            Some(TokenKind::RegistrationAccess) => Self::ByRegistrationAccessToken,
            Some(TokenKind::Bearer) => Self::ByAuthenticatedUser,
        }
    }
}

impl fmt::Display for RegistrationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies when the registration source is in the allow-set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatingSourceCondition {
    sources: BTreeSet<RegistrationSource>,
}

impl UpdatingSourceCondition {
    pub fn new(sources: impl IntoIterator<Item = RegistrationSource>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        let settings = ComponentSettings::new(record);
        let sources = settings
            .list(UPDATE_CLIENT_SOURCE)
            .iter()
            .map(|value| {
                RegistrationSource::parse(value)
                    .ok_or_else(|| settings.invalid(format!("unknown update source: {value}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sources))
    }
}

impl PolicyCondition for UpdatingSourceCondition {
    fn provider_id(&self) -> &'static str {
        providers::UPDATING_CLIENT_SOURCE
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        if !context.event().is_registration() {
            return Ok(ConditionVote::NotApplicable);
        }
        Ok(ConditionVote::from_match(
            self.sources.contains(&RegistrationSource::classify(context)),
        ))
    }
}

/// Trusted `host[:port]` entry
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrustedHost {
    host: String,
    port: Option<u16>,
}

impl TrustedHost {
    fn parse(entry: &str) -> Option<Self> {
        let (host, port) = split_host_port(entry)?;
        Some(Self {
            host: host.to_ascii_lowercase(),
            port,
        })
    }

    fn matches(&self, origin: &str) -> bool {
        let Some((host, port)) = split_host_port(origin) else {
            return false;
        };
        if !self.host.eq_ignore_ascii_case(host) {
            return false;
        }
        match (self.port, port) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}

fn split_host_port(value: &str) -> Option<(&str, Option<u16>)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => {
            Some((host, Some(port.parse().ok()?)))
        }
        _ => Some((value, None)),
    }
}

/// Applies when the request originates from a trusted host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatingSourceHostsCondition {
    hosts: Vec<TrustedHost>,
}

impl UpdatingSourceHostsCondition {
    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        let settings = ComponentSettings::new(record);
        let hosts = settings
            .list(TRUSTED_HOSTS)
            .iter()
            .map(|entry| {
                TrustedHost::parse(entry)
                    .ok_or_else(|| settings.invalid(format!("invalid trusted host: {entry}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { hosts })
    }
}

impl PolicyCondition for UpdatingSourceHostsCondition {
    fn provider_id(&self) -> &'static str {
        providers::UPDATING_CLIENT_SOURCE_HOSTS
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        if !context.event().is_registration() {
            return Ok(ConditionVote::NotApplicable);
        }
        let Some(origin) = context.origin().host.as_deref() else {
            return Ok(ConditionVote::Deny);
        };
        Ok(ConditionVote::from_match(
            self.hosts.iter().any(|host| host.matches(origin)),
        ))
    }
}

/// Applies when the authenticated user belongs to a configured group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatingSourceGroupsCondition {
    groups: BTreeSet<String>,
}

impl UpdatingSourceGroupsCondition {
    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        Self {
            groups: ComponentSettings::new(record).list(GROUPS).into_iter().collect(),
        }
    }
}

impl PolicyCondition for UpdatingSourceGroupsCondition {
    fn provider_id(&self) -> &'static str {
        providers::UPDATING_CLIENT_SOURCE_GROUPS
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        if !context.event().is_registration() {
            return Ok(ConditionVote::NotApplicable);
        }
        let Some(user) = context.authenticated_user() else {
            return Ok(ConditionVote::Deny);
        };
        Ok(ConditionVote::from_match(
            !user.groups.is_disjoint(&self.groups),
        ))
    }
}

/// Applies when the authenticated user holds a configured role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatingSourceRolesCondition {
    roles: BTreeSet<String>,
}

impl UpdatingSourceRolesCondition {
    pub(crate) fn from_component(record: &ComponentRecord) -> Self {
        Self {
            roles: ComponentSettings::new(record).list(ROLES).into_iter().collect(),
        }
    }
}

impl PolicyCondition for UpdatingSourceRolesCondition {
    fn provider_id(&self) -> &'static str {
        providers::UPDATING_CLIENT_SOURCE_ROLES
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        if !context.event().is_registration() {
            return Ok(ConditionVote::NotApplicable);
        }
        let Some(user) = context.authenticated_user() else {
            return Ok(ConditionVote::Deny);
        };
        Ok(ConditionVote::from_match(!user.roles.is_disjoint(&self.roles)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_policy_types::{
        AuthenticatedUser, ClientRepresentation, PresentedToken, Realm, RequestOrigin,
    };

    fn register() -> PolicyContext {
        PolicyContext::register(Realm::new("test"), ClientRepresentation::new("app"))
    }

    #[test]
    fn test_source_classification() {
        assert_eq!(RegistrationSource::classify(&register()), RegistrationSource::ByAnonymous);

        let ctx = register().with_token(PresentedToken::initial_access());
        assert_eq!(RegistrationSource::classify(&ctx), RegistrationSource::ByInitialAccessToken);

        let ctx = register().with_token(PresentedToken::bearer("user-1", "admin-cli"));
        assert_eq!(RegistrationSource::classify(&ctx), RegistrationSource::ByAuthenticatedUser);
    }

    #[test]
    fn test_source_condition() {
        let condition = UpdatingSourceCondition::new([RegistrationSource::ByAuthenticatedUser]);

        let by_user = register().with_token(PresentedToken::bearer("user-1", "admin-cli"));
        assert_eq!(condition.evaluate(&by_user).unwrap(), ConditionVote::Applicable);

        let anonymous = register();
        assert_eq!(condition.evaluate(&anonymous).unwrap(), ConditionVote::Deny);

        let view = PolicyContext::view(Realm::new("test"), ClientRepresentation::new("app"));
        assert_eq!(condition.evaluate(&view).unwrap(), ConditionVote::NotApplicable);
    }

    #[test]
    fn test_unknown_source_rejected_at_load() {
        let record = ComponentRecord::condition("UpdatingClientSourceCondition", "test", providers::UPDATING_CLIENT_SOURCE)
            .with_config(UPDATE_CLIENT_SOURCE, ["ByCarrierPigeon"]);
        assert!(UpdatingSourceCondition::from_component(&record).is_err());
    }

    #[test]
    fn test_trusted_host_matching() {
        let host = TrustedHost::parse("LocalHost:8543").unwrap();
        assert!(host.matches("localhost:8543"));
        assert!(host.matches("localhost"));
        assert!(!host.matches("localhost:8080"));
        assert!(!host.matches("example.com"));

        let any_port = TrustedHost::parse("localhost").unwrap();
        assert!(any_port.matches("LOCALHOST:9000"));

        assert!(TrustedHost::parse("localhost:http").is_none());
    }

    #[test]
    fn test_hosts_condition_without_origin_denies() {
        let record = ComponentRecord::condition("UpdatingClientSourceHostsCondition", "test", providers::UPDATING_CLIENT_SOURCE_HOSTS)
            .with_config(TRUSTED_HOSTS, ["localhost"]);
        let condition = UpdatingSourceHostsCondition::from_component(&record).unwrap();

        assert_eq!(condition.evaluate(&register()).unwrap(), ConditionVote::Deny);

        let ctx = register().with_origin(RequestOrigin::default().with_host("localhost"));
        assert_eq!(condition.evaluate(&ctx).unwrap(), ConditionVote::Applicable);
    }

    #[test]
    fn test_groups_and_roles_need_a_user() {
        let groups = UpdatingSourceGroupsCondition::from_component(
            &ComponentRecord::condition("Groups", "test", providers::UPDATING_CLIENT_SOURCE_GROUPS)
                .with_config(GROUPS, ["topGroup"]),
        );
        let roles = UpdatingSourceRolesCondition::from_component(
            &ComponentRecord::condition("Roles", "test", providers::UPDATING_CLIENT_SOURCE_ROLES)
                .with_config(ROLES, ["manage-clients"]),
        );

        assert_eq!(groups.evaluate(&register()).unwrap(), ConditionVote::Deny);
        assert_eq!(roles.evaluate(&register()).unwrap(), ConditionVote::Deny);

        let user = AuthenticatedUser::new("u-1", "john")
            .with_group("topGroup")
            .with_role("view-clients");
        let ctx = register().with_authenticated_user(user);
        assert_eq!(groups.evaluate(&ctx).unwrap(), ConditionVote::Applicable);
        assert_eq!(roles.evaluate(&ctx).unwrap(), ConditionVote::Deny);
    }
}
