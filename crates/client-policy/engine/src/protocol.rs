//! Mapping of policy errors to protocol responses
//!
//! Callers surface a single error code and description per rejected
//! operation. Component names only appear when diagnostics are exposed.

use crate::error::{codes, ClientPolicyError, EVALUATION_FAILED};
use client_policy_types::ClientPolicyEvent;
use serde::Serialize;
use std::fmt;

/// Protocol endpoint an event is raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Client registration (dynamic or admin)
    Registration,
    Authorization,
    Token,
    Other,
}

impl Endpoint {
    pub fn for_event(event: ClientPolicyEvent) -> Self {
        match event {
            ClientPolicyEvent::ClientRegister
            | ClientPolicyEvent::ClientUpdate
            | ClientPolicyEvent::ClientView
            | ClientPolicyEvent::ClientRegistered => Self::Registration,
            ClientPolicyEvent::AuthorizationRequest => Self::Authorization,
            ClientPolicyEvent::TokenRequest
            | ClientPolicyEvent::TokenRefresh
            | ClientPolicyEvent::TokenRevoke
            | ClientPolicyEvent::IntrospectToken => Self::Token,
            ClientPolicyEvent::Logout | ClientPolicyEvent::UserinfoRequest => Self::Other,
        }
    }

    /// Error code used by this endpoint for rejected requests
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Registration => codes::INVALID_REGISTRATION,
            Self::Authorization | Self::Other => codes::INVALID_REQUEST,
            Self::Token => codes::INVALID_GRANT,
        }
    }
}

/// Error response body returned by protocol endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolError {
    /// HTTP status
    #[serde(skip)]
    pub status: u16,

    pub error: String,

    pub error_description: String,
}

impl ProtocolError {
    /// Map an engine error raised for `event`
    pub fn for_event(event: ClientPolicyEvent, err: &ClientPolicyError, expose_diagnostics: bool) -> Self {
        let endpoint = Endpoint::for_event(event);

        match err {
            ClientPolicyError::Violation(violation) => Self {
                status: 400,
                error: endpoint.error_code().to_string(),
                error_description: violation.error_description.clone(),
            },
            ClientPolicyError::ConditionFailure { condition, .. } => Self {
                status: 400,
                error: endpoint.error_code().to_string(),
                error_description: describe(expose_diagnostics, condition),
            },
            ClientPolicyError::Configuration { component, .. } => Self {
                status: 500,
                error: "server_error".to_string(),
                error_description: describe(expose_diagnostics, component),
            },
            ClientPolicyError::Store(_) => Self {
                status: 500,
                error: "server_error".to_string(),
                error_description: EVALUATION_FAILED.to_string(),
            },
        }
    }
}

fn describe(expose_diagnostics: bool, component: &str) -> String {
    if expose_diagnostics {
        format!("{EVALUATION_FAILED}: {component}")
    } else {
        EVALUATION_FAILED.to_string()
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.error, self.error_description)
    }
}
