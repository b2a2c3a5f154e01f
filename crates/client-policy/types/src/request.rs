//! Protocol request parameters visible to request-time policies

use serde::{Deserialize, Serialize};

/// OpenID scope value
pub const SCOPE_OPENID: &str = "openid";

/// Parameters of an authorization or token endpoint request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    /// Resolved scopes of the request
    #[serde(default)]
    pub scope: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,

    /// Challenge recorded with the authorization code being exchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_code_challenge: Option<String>,

    /// Challenge method recorded with the authorization code being exchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_code_challenge_method: Option<String>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }

    /// Set the scopes from a space separated scope string
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.code_challenge = Some(challenge.into());
        self.code_challenge_method = Some(method.into());
        self
    }

    pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }

    /// Record the challenge bound to the authorization code
    pub fn with_issued_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.issued_code_challenge = Some(challenge.into());
        self.issued_code_challenge_method = Some(method.into());
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }

    /// Whitespace separated response type values
    pub fn response_type_values(&self) -> Vec<&str> {
        self.response_type
            .as_deref()
            .map(|rt| rt.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_response_type(&self, value: &str) -> bool {
        self.response_type_values().contains(&value)
    }
}
