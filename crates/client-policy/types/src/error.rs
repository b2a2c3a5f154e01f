//! Error types for building policy contexts

use crate::event::ClientPolicyEvent;
use thiserror::Error;

/// Context construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A request-time context was requested for another event
    #[error("event {0} is not a request-time event")]
    NotRequestTime(ClientPolicyEvent),
}
