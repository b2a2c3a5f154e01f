//! # Client Policy Engine
//!
//! Administrator-defined policies gating and augmenting OAuth/OIDC client
//! registrations and the requests those clients make afterwards.
//!
//! ## Overview
//!
//! A policy is a persisted component listing ordered condition and executor
//! component ids. For every lifecycle event the protocol layer builds a
//! [`PolicyContext`](client_policy_types::PolicyContext) and calls
//! [`ClientPolicyManager::trigger`]:
//!
//! 1. the realm's policies are read fresh from the [`ComponentStore`]
//! 2. each policy's conditions vote; a `DENY` deactivates the policy
//! 3. executors of active policies run in order and may reject the event
//!    or augment the proposed client representation
//!
//! The first rejection aborts the evaluation. Failures during the
//! post-commit `CLIENT_REGISTERED` notification are only recorded.
//!
//! ## Key Components
//!
//! - [`ClientPolicyManager`]: trigger entry point
//! - [`PolicyRegistry`]: resolves component records into [`ClientPolicy`] values
//! - [`ConditionKind`] / [`ExecutorKind`]: known providers with typed configuration
//! - [`EvaluationCard`]: audit record of one trigger call
//! - [`ProtocolError`]: error body surfaced by the protocol endpoints
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use client_policy_engine::{ClientPolicyManager, EngineConfig, InMemoryComponentStore};
//! use client_policy_types::{policy_keys, ClientRepresentation, ComponentRecord, PolicyContext, Realm};
//!
//! let store = Arc::new(InMemoryComponentStore::new());
//! let pkce = store
//!     .add(ComponentRecord::executor("PKCEEnforceExecutor", "test", "pkce-enforce")
//!         .with_config("is-augment", ["true"]))
//!     .unwrap();
//! store
//!     .add(ComponentRecord::policy("MyPolicy", "test")
//!         .with_config(policy_keys::EXECUTOR_IDS, [pkce]))
//!     .unwrap();
//!
//! let manager = ClientPolicyManager::new(store, EngineConfig::default());
//! let mut ctx = PolicyContext::register(Realm::new("test"), ClientRepresentation::new("app"));
//! let card = manager.trigger(&mut ctx).unwrap();
//!
//! assert!(card.was_augmented());
//! let client = ctx.into_proposed_representation().unwrap();
//! assert_eq!(client.pkce_code_challenge_method(), Some("S256"));
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod card;
pub mod condition;
pub mod config;
pub mod error;
pub mod executor;
pub mod manager;
pub mod policy;
pub mod protocol;
pub mod registry;
pub mod store;

// Re-exports
pub use card::{EvaluationCard, ExecutorRecord, PolicyEvaluationRecord};
pub use condition::{Condition, ConditionKind, PolicyCondition, RegistrationSource};
pub use config::{AbstentionMode, EngineConfig};
pub use error::{ClientPolicyError, PolicyViolation, Result, StoreError};
pub use executor::{Executor, ExecutorKind, PolicyExecutor};
pub use manager::ClientPolicyManager;
pub use policy::{Activation, ClientPolicy, ConditionVoteRecord};
pub use protocol::{Endpoint, ProtocolError};
pub use registry::{ComponentStore, PolicyRegistry};
pub use store::InMemoryComponentStore;
