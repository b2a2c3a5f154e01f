//! # Client Policy Types
//!
//! Data model shared between the client policy engine and the protocol
//! layer that triggers it.
//!
//! ## Overview
//!
//! - [`ClientPolicyEvent`]: lifecycle point being guarded
//! - [`PolicyContext`]: per-event snapshot handed to the engine
//! - [`ConditionVote`] / [`ExecutorOutcome`]: results of conditions and executors
//! - [`ComponentRecord`]: generic persisted policy, condition or executor
//!
//! ## Example
//!
//! ```rust
//! use client_policy_types::{
//!     ClientPolicyEvent, ClientRepresentation, PolicyContext, PresentedToken, Realm,
//! };
//!
//! let ctx = PolicyContext::register(Realm::new("test"), ClientRepresentation::new("app"))
//!     .with_token(PresentedToken::initial_access());
//!
//! assert_eq!(ctx.event(), ClientPolicyEvent::ClientRegister);
//! assert!(ctx.proposed_representation().is_some());
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod component;
pub mod context;
pub mod error;
pub mod event;
pub mod identity;
pub mod request;
pub mod vote;

pub use client::{
    attributes, authenticator, AccessType, ClientRepresentation, PKCE_METHOD_S256,
};
pub use component::{
    policy_keys, provider_type, ComponentConfig, ComponentRecord, DEFAULT_POLICY_PROVIDER,
};
pub use context::{EventPayload, PolicyContext};
pub use error::ContextError;
pub use event::ClientPolicyEvent;
pub use identity::{
    AuthenticatedUser, PresentedToken, Realm, RequestOrigin, TokenKind,
    DEFAULT_SIGNATURE_ALGORITHM,
};
pub use request::{RequestParameters, SCOPE_OPENID};
pub use vote::{ConditionVote, ExecutorOutcome};
