//! Client metadata as seen by the policy engine
//!
//! The same shape is used for the representation proposed during
//! registration and for the snapshot of an already persisted client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Client authenticator ids
pub mod authenticator {
    /// Client id and secret (the default)
    pub const CLIENT_SECRET: &str = "client-secret";
    /// Signed JWT
    pub const CLIENT_JWT: &str = "client-jwt";
    /// JWT signed with the client secret
    pub const CLIENT_SECRET_JWT: &str = "client-secret-jwt";
    /// Mutual TLS client certificate
    pub const CLIENT_X509: &str = "client-x509";
}

/// Client attribute keys
pub mod attributes {
    pub const PKCE_CODE_CHALLENGE_METHOD: &str = "pkce.code.challenge.method";
    pub const ID_TOKEN_SIGNED_RESPONSE_ALG: &str = "id.token.signed.response.alg";
    pub const USER_INFO_RESPONSE_SIGNATURE_ALG: &str = "user.info.response.signature.alg";
    pub const REQUEST_OBJECT_SIGNATURE_ALG: &str = "request.object.signature.alg";
    pub const TOKEN_ENDPOINT_AUTH_SIGNING_ALG: &str = "token.endpoint.auth.signing.alg";
    pub const ACCESS_TOKEN_SIGNED_RESPONSE_ALG: &str = "access.token.signed.response.alg";

    /// Every signature algorithm attribute a client may declare
    pub const SIGNATURE_ALGORITHMS: [&str; 5] = [
        ID_TOKEN_SIGNED_RESPONSE_ALG,
        USER_INFO_RESPONSE_SIGNATURE_ALG,
        REQUEST_OBJECT_SIGNATURE_ALG,
        TOKEN_ENDPOINT_AUTH_SIGNING_ALG,
        ACCESS_TOKEN_SIGNED_RESPONSE_ALG,
    ];
}

/// PKCE code challenge method S256
pub const PKCE_METHOD_S256: &str = "S256";

/// Public / confidential / bearer-only classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessType {
    Public,
    Confidential,
    BearerOnly,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Confidential => "confidential",
            Self::BearerOnly => "bearer-only",
        }
    }

    /// Parse a configured access type name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "confidential" => Some(Self::Confidential),
            "bearer-only" | "bearer_only" | "beareronly" => Some(Self::BearerOnly),
            _ => None,
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    /// Client identifier
    pub client_id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the client is public
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,

    /// Whether the client only accepts bearer tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_only: Option<bool>,

    /// Client authenticator id (see [`authenticator`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_authenticator_type: Option<String>,

    /// Roles granted to the client
    #[serde(default)]
    pub default_roles: Vec<String>,

    /// Registered redirect URIs
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Whether the service account is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_accounts_enabled: Option<bool>,

    /// Protocol attributes (see [`attributes`])
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ClientRepresentation {
    /// Create a representation for the given client id
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Set the client authenticator
    pub fn with_authenticator(mut self, authenticator: impl Into<String>) -> Self {
        self.client_authenticator_type = Some(authenticator.into());
        self
    }

    /// Add a client role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.default_roles.push(role.into());
        self
    }

    /// Mark the client public
    pub fn with_public_client(mut self, public: bool) -> Self {
        self.public_client = Some(public);
        self
    }

    /// Mark the client bearer-only
    pub fn with_bearer_only(mut self, bearer_only: bool) -> Self {
        self.bearer_only = Some(bearer_only);
        self
    }

    /// Set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Access type derived from the bearer-only and public flags
    pub fn access_type(&self) -> AccessType {
        if self.bearer_only.unwrap_or(false) {
            AccessType::BearerOnly
        } else if self.public_client.unwrap_or(false) {
            AccessType::Public
        } else {
            AccessType::Confidential
        }
    }

    /// Effective authenticator; clients that declare none use the client secret
    pub fn authenticator(&self) -> &str {
        self.client_authenticator_type
            .as_deref()
            .unwrap_or(authenticator::CLIENT_SECRET)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.default_roles.iter().any(|r| r == role)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn pkce_code_challenge_method(&self) -> Option<&str> {
        self.attribute(attributes::PKCE_CODE_CHALLENGE_METHOD)
    }

    /// Set or clear the PKCE code challenge method
    pub fn set_pkce_code_challenge_method(&mut self, method: Option<&str>) {
        match method {
            Some(method) => {
                self.attributes.insert(
                    attributes::PKCE_CODE_CHALLENGE_METHOD.to_string(),
                    method.to_string(),
                );
            }
            None => {
                self.attributes.remove(attributes::PKCE_CODE_CHALLENGE_METHOD);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_type_derivation() {
        let client = ClientRepresentation::new("app");
        assert_eq!(client.access_type(), AccessType::Confidential);

        let public = ClientRepresentation::new("spa").with_public_client(true);
        assert_eq!(public.access_type(), AccessType::Public);

        let bearer = ClientRepresentation::new("api")
            .with_public_client(true)
            .with_bearer_only(true);
        assert_eq!(bearer.access_type(), AccessType::BearerOnly);
    }

    #[test]
    fn test_default_authenticator() {
        let client = ClientRepresentation::new("app");
        assert_eq!(client.authenticator(), authenticator::CLIENT_SECRET);

        let jwt = client.with_authenticator(authenticator::CLIENT_JWT);
        assert_eq!(jwt.authenticator(), authenticator::CLIENT_JWT);
    }

    #[test]
    fn test_pkce_attribute() {
        let mut client = ClientRepresentation::new("app");
        assert!(client.pkce_code_challenge_method().is_none());

        client.set_pkce_code_challenge_method(Some(PKCE_METHOD_S256));
        assert_eq!(client.pkce_code_challenge_method(), Some("S256"));

        client.set_pkce_code_challenge_method(None);
        assert!(client.pkce_code_challenge_method().is_none());
    }

    #[test]
    fn test_empty_attribute_is_absent() {
        let client = ClientRepresentation::new("app")
            .with_attribute(attributes::ID_TOKEN_SIGNED_RESPONSE_ALG, "");
        assert!(client
            .attribute(attributes::ID_TOKEN_SIGNED_RESPONSE_ALG)
            .is_none());
    }

    #[test]
    fn test_access_type_parse() {
        assert_eq!(AccessType::parse("Confidential"), Some(AccessType::Confidential));
        assert_eq!(AccessType::parse("bearer-only"), Some(AccessType::BearerOnly));
        assert_eq!(AccessType::parse("hybrid"), None);
    }
}
