//! Realm, caller and credential snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Default realm signature algorithm
pub const DEFAULT_SIGNATURE_ALGORITHM: &str = "RS256";

/// Read-only snapshot of the realm an event belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Realm {
    /// Realm name; also the parent id of its components
    pub name: String,

    /// Algorithm used for tokens when a client declares none
    pub default_signature_algorithm: String,
}

impl Realm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_signature_algorithm: DEFAULT_SIGNATURE_ALGORITHM.to_string(),
        }
    }

    pub fn with_default_signature_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.default_signature_algorithm = algorithm.into();
        self
    }
}

/// End user resolved from the presented token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }
}

/// Kind of bearer credential presented with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// One-time token authorizing anonymous registration
    InitialAccess,

    /// Token issued with a registration for later self-management
    RegistrationAccess,

    /// Regular access token of an authenticated end user
    Bearer,
}

/// Token presented by the caller, already verified by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedToken {
    pub kind: TokenKind,

    /// Subject (user id) of the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Client the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_for: Option<String>,
}

impl PresentedToken {
    pub fn initial_access() -> Self {
        Self {
            kind: TokenKind::InitialAccess,
            subject: None,
            issued_for: None,
        }
    }

    pub fn registration_access(client_id: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::RegistrationAccess,
            subject: None,
            issued_for: Some(client_id.into()),
        }
    }

    pub fn bearer(subject: impl Into<String>, issued_for: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Bearer,
            subject: Some(subject.into()),
            issued_for: Some(issued_for.into()),
        }
    }
}

/// Network origin of the current request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    /// Source address of the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,

    /// Host the caller resolved to, optionally with `:port`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl RequestOrigin {
    pub fn from_address(address: IpAddr) -> Self {
        Self {
            address: Some(address),
            host: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}
