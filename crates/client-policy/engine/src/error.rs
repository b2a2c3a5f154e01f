//! Error types for client policy evaluation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth error codes raised by executors
pub mod codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_GRANT: &str = "invalid_grant";
    pub const INVALID_CLIENT_METADATA: &str = "invalid_client_metadata";
    /// Code surfaced by the registration endpoints for any rejection
    pub const INVALID_REGISTRATION: &str = "invalid_registration";
}

/// Generic description used when a condition faults
pub const EVALUATION_FAILED: &str = "client policy evaluation failed";

/// Executor rejection carrying a stable OAuth error code
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{error}: {error_description}")]
pub struct PolicyViolation {
    /// OAuth error code
    pub error: String,

    /// Human readable description
    pub error_description: String,
}

impl PolicyViolation {
    pub fn new(error: impl Into<String>, error_description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: error_description.into(),
        }
    }

    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, description)
    }

    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::new(codes::INVALID_GRANT, description)
    }

    /// `invalid_client_metadata` naming the offending field
    pub fn invalid_client_metadata(field: &str) -> Self {
        Self::new(
            codes::INVALID_CLIENT_METADATA,
            format!("Invalid client metadata: {field}"),
        )
    }

    /// `invalid_request` for an absent request parameter
    pub fn missing_parameter(parameter: &str) -> Self {
        Self::invalid_request(format!("Missing parameter: {parameter}"))
    }

    /// `invalid_request` for a malformed request parameter
    pub fn invalid_parameter(parameter: &str) -> Self {
        Self::invalid_request(format!("Invalid parameter: {parameter}"))
    }
}

/// Component store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Component not found: {0}")]
    NotFound(String),

    #[error("Component already exists: {0}")]
    AlreadyExists(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Lock error")]
    Lock,
}

/// Client policy errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientPolicyError {
    /// An executor rejected the request
    #[error("Policy violation: {0}")]
    Violation(PolicyViolation),

    /// A policy references a missing or malformed component
    #[error("Invalid configuration of {component}: {reason}")]
    Configuration { component: String, reason: String },

    /// A condition faulted while evaluating
    #[error("Condition {condition} failed: {reason}")]
    ConditionFailure { condition: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ClientPolicyError {
    pub fn configuration(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    pub fn condition_failure(condition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConditionFailure {
            condition: condition.into(),
            reason: reason.into(),
        }
    }

    /// The executor rejection, if this is one
    pub fn violation(&self) -> Option<&PolicyViolation> {
        match self {
            Self::Violation(violation) => Some(violation),
            _ => None,
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Violation(_))
    }
}

impl From<PolicyViolation> for ClientPolicyError {
    fn from(violation: PolicyViolation) -> Self {
        Self::Violation(violation)
    }
}

/// Result type for client policy operations
pub type Result<T> = std::result::Result<T, ClientPolicyError>;
