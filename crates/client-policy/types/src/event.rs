//! Lifecycle events guarded by client policies
//!
//! Each event fixes which parts of a [`PolicyContext`](crate::PolicyContext)
//! are populated. Registration events carry a mutable proposed
//! representation, request-time events carry request parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle point at which the policy engine is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientPolicyEvent {
    /// A client is being registered (dynamic or admin registration)
    ClientRegister,

    /// An existing client is being updated
    ClientUpdate,

    /// A client registration is being read back
    ClientView,

    /// Post-commit notification after a successful registration
    ClientRegistered,

    /// Authorization endpoint request
    AuthorizationRequest,

    /// Authorization code exchange at the token endpoint
    TokenRequest,

    /// Refresh token grant
    TokenRefresh,

    /// Token revocation
    TokenRevoke,

    /// Logout request
    Logout,

    /// Userinfo endpoint request
    UserinfoRequest,

    /// Token introspection
    IntrospectToken,
}

impl ClientPolicyEvent {
    /// All events, in lifecycle order
    pub const ALL: [ClientPolicyEvent; 11] = [
        Self::ClientRegister,
        Self::ClientUpdate,
        Self::ClientView,
        Self::ClientRegistered,
        Self::AuthorizationRequest,
        Self::TokenRequest,
        Self::TokenRefresh,
        Self::TokenRevoke,
        Self::Logout,
        Self::UserinfoRequest,
        Self::IntrospectToken,
    ];

    /// Stable wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientRegister => "CLIENT_REGISTER",
            Self::ClientUpdate => "CLIENT_UPDATE",
            Self::ClientView => "CLIENT_VIEW",
            Self::ClientRegistered => "CLIENT_REGISTERED",
            Self::AuthorizationRequest => "AUTHORIZATION_REQUEST",
            Self::TokenRequest => "TOKEN_REQUEST",
            Self::TokenRefresh => "TOKEN_REFRESH",
            Self::TokenRevoke => "TOKEN_REVOKE",
            Self::Logout => "LOGOUT",
            Self::UserinfoRequest => "USERINFO_REQUEST",
            Self::IntrospectToken => "INTROSPECT_TOKEN",
        }
    }

    /// Events whose proposed representation may be augmented
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::ClientRegister | Self::ClientUpdate)
    }

    /// Events raised by the protocol endpoints after registration
    pub fn is_request_time(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationRequest
                | Self::TokenRequest
                | Self::TokenRefresh
                | Self::TokenRevoke
                | Self::Logout
                | Self::UserinfoRequest
                | Self::IntrospectToken
        )
    }

    /// Request-time events that arrive over the back channel rather than
    /// through the user agent
    pub fn is_back_channel(&self) -> bool {
        self.is_request_time() && !matches!(self, Self::AuthorizationRequest)
    }

    /// Post-commit notifications that must never fail the operation
    pub fn is_post_commit(&self) -> bool {
        matches!(self, Self::ClientRegistered)
    }
}

impl fmt::Display for ClientPolicyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
