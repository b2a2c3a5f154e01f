//! Executor providers
//!
//! Executors run in declared order once their policy is active. Each one
//! validates the event it recognizes, rejects it with a [`PolicyViolation`],
//! or augments the proposed representation of a registration or update.
//! Events an executor does not recognize pass untouched.

mod client_auth;
mod pkce;
mod response_type;
mod session;
mod signing_alg;

pub use client_auth::SecureClientAuthExecutor;
pub use pkce::{s256_challenge, PkceEnforceExecutor};
pub use response_type::SecureResponseTypeExecutor;
pub use session::SecureSessionExecutor;
pub use signing_alg::{SecureSigningAlgorithmExecutor, DEFAULT_ALLOWED_ALGORITHMS};

use crate::error::{ClientPolicyError, PolicyViolation, Result};
use client_policy_types::{provider_type, ComponentRecord, ExecutorOutcome, PolicyContext};

/// Provider ids of the known executors
pub mod providers {
    pub const PKCE_ENFORCE: &str = "pkce-enforce";
    pub const SECURE_CLIENT_AUTHN_ENFORCE: &str = "secure-client-authn-enforce";
    pub const SECURE_RESPONSE_TYPE_ENFORCE: &str = "secure-response-type-enforce";
    pub const SECURE_SESSION_ENFORCE: &str = "secure-session-enforce";
    pub const SECURE_SIGNING_ALGORITHM_ENFORCE: &str = "secure-signing-algorithm-enforce";
}

/// Configuration key shared by augmenting executors
pub(crate) const IS_AUGMENT: &str = "is-augment";

/// Executor contract
pub trait PolicyExecutor: Send + Sync + std::fmt::Debug {
    fn provider_id(&self) -> &'static str;

    /// Run against the event carried by `context`
    fn execute(&self, context: &mut PolicyContext)
        -> std::result::Result<ExecutorOutcome, PolicyViolation>;
}

/// Known executor kinds
#[derive(Debug, Clone)]
pub enum ExecutorKind {
    Pkce(PkceEnforceExecutor),
    ClientAuth(SecureClientAuthExecutor),
    ResponseType(SecureResponseTypeExecutor),
    Session(SecureSessionExecutor),
    SigningAlgorithm(SecureSigningAlgorithmExecutor),
}

impl ExecutorKind {
    /// Decode an executor kind from its component record
    pub fn from_component(record: &ComponentRecord) -> Result<Self> {
        let kind = match record.provider_id.as_str() {
            providers::PKCE_ENFORCE => Self::Pkce(PkceEnforceExecutor::from_component(record)?),
            providers::SECURE_CLIENT_AUTHN_ENFORCE => {
                Self::ClientAuth(SecureClientAuthExecutor::from_component(record)?)
            }
            providers::SECURE_RESPONSE_TYPE_ENFORCE => {
                Self::ResponseType(SecureResponseTypeExecutor::from_component(record))
            }
            providers::SECURE_SESSION_ENFORCE => Self::Session(SecureSessionExecutor),
            providers::SECURE_SIGNING_ALGORITHM_ENFORCE => {
                Self::SigningAlgorithm(SecureSigningAlgorithmExecutor::from_component(record))
            }
            other => {
                return Err(ClientPolicyError::configuration(
                    &record.name,
                    format!("unknown executor provider: {other}"),
                ))
            }
        };
        Ok(kind)
    }

    fn as_executor(&self) -> &dyn PolicyExecutor {
        match self {
            Self::Pkce(e) => e,
            Self::ClientAuth(e) => e,
            Self::ResponseType(e) => e,
            Self::Session(e) => e,
            Self::SigningAlgorithm(e) => e,
        }
    }
}

impl PolicyExecutor for ExecutorKind {
    fn provider_id(&self) -> &'static str {
        self.as_executor().provider_id()
    }

    fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        self.as_executor().execute(context)
    }
}

/// Executor instance referenced by a policy
#[derive(Debug, Clone)]
pub struct Executor {
    pub id: String,
    pub name: String,
    pub kind: ExecutorKind,
}

impl Executor {
    /// Resolve an executor from its persisted record
    pub fn from_component(record: &ComponentRecord) -> Result<Self> {
        if record.provider_type != provider_type::EXECUTOR {
            return Err(ClientPolicyError::configuration(
                &record.name,
                format!("expected an executor, found {}", record.provider_type),
            ));
        }

        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: ExecutorKind::from_component(record)?,
        })
    }

    pub fn execute(
        &self,
        context: &mut PolicyContext,
    ) -> std::result::Result<ExecutorOutcome, PolicyViolation> {
        self.kind.execute(context)
    }
}
