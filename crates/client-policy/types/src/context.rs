//! Per-event policy context
//!
//! A [`PolicyContext`] is built once by the protocol layer for the event it
//! is handling and handed to the engine. The event-specific part is an
//! [`EventPayload`]; only the registration payloads expose a mutable
//! proposed representation, the persisted client is always read-only.

use crate::client::ClientRepresentation;
use crate::error::ContextError;
use crate::event::ClientPolicyEvent;
use crate::identity::{AuthenticatedUser, PresentedToken, Realm, RequestOrigin};
use crate::request::RequestParameters;
use serde::Serialize;

/// Event-specific fields of a context
///
/// Serialize-only: contexts are built through the [`PolicyContext`]
/// constructors, which reject request payloads for non request-time events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventPayload {
    Register {
        proposed: ClientRepresentation,
    },
    Update {
        proposed: ClientRepresentation,
        registered: ClientRepresentation,
    },
    Registered {
        proposed: ClientRepresentation,
        registered: ClientRepresentation,
    },
    View {
        registered: ClientRepresentation,
    },
    Request {
        request_event: ClientPolicyEvent,
        registered: ClientRepresentation,
        parameters: RequestParameters,
    },
}

impl EventPayload {
    pub fn event(&self) -> ClientPolicyEvent {
        match self {
            Self::Register { .. } => ClientPolicyEvent::ClientRegister,
            Self::Update { .. } => ClientPolicyEvent::ClientUpdate,
            Self::Registered { .. } => ClientPolicyEvent::ClientRegistered,
            Self::View { .. } => ClientPolicyEvent::ClientView,
            Self::Request { request_event, .. } => *request_event,
        }
    }
}

/// Snapshot of everything a condition or executor may look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyContext {
    realm: Realm,
    authenticated_client: Option<ClientRepresentation>,
    authenticated_user: Option<AuthenticatedUser>,
    token: Option<PresentedToken>,
    origin: RequestOrigin,
    payload: EventPayload,
}

impl PolicyContext {
    fn from_payload(realm: Realm, payload: EventPayload) -> Self {
        Self {
            realm,
            authenticated_client: None,
            authenticated_user: None,
            token: None,
            origin: RequestOrigin::default(),
            payload,
        }
    }

    /// Context for `CLIENT_REGISTER`
    pub fn register(realm: Realm, proposed: ClientRepresentation) -> Self {
        Self::from_payload(realm, EventPayload::Register { proposed })
    }

    /// Context for `CLIENT_UPDATE`
    pub fn update(
        realm: Realm,
        registered: ClientRepresentation,
        proposed: ClientRepresentation,
    ) -> Self {
        Self::from_payload(
            realm,
            EventPayload::Update {
                proposed,
                registered,
            },
        )
    }

    /// Context for the post-commit `CLIENT_REGISTERED` notification
    pub fn registered(
        realm: Realm,
        proposed: ClientRepresentation,
        registered: ClientRepresentation,
    ) -> Self {
        Self::from_payload(
            realm,
            EventPayload::Registered {
                proposed,
                registered,
            },
        )
    }

    /// Context for `CLIENT_VIEW`
    pub fn view(realm: Realm, registered: ClientRepresentation) -> Self {
        Self::from_payload(realm, EventPayload::View { registered })
    }

    /// Context for a request-time event
    pub fn request(
        event: ClientPolicyEvent,
        realm: Realm,
        registered: ClientRepresentation,
        parameters: RequestParameters,
    ) -> Result<Self, ContextError> {
        if !event.is_request_time() {
            return Err(ContextError::NotRequestTime(event));
        }
        Ok(Self::from_payload(
            realm,
            EventPayload::Request {
                request_event: event,
                registered,
                parameters,
            },
        ))
    }

    /// Context for `AUTHORIZATION_REQUEST`
    pub fn authorization_request(
        realm: Realm,
        registered: ClientRepresentation,
        parameters: RequestParameters,
    ) -> Self {
        Self::from_payload(
            realm,
            EventPayload::Request {
                request_event: ClientPolicyEvent::AuthorizationRequest,
                registered,
                parameters,
            },
        )
    }

    /// Context for `TOKEN_REQUEST`
    pub fn token_request(
        realm: Realm,
        registered: ClientRepresentation,
        parameters: RequestParameters,
    ) -> Self {
        Self::from_payload(
            realm,
            EventPayload::Request {
                request_event: ClientPolicyEvent::TokenRequest,
                registered,
                parameters,
            },
        )
    }

    /// Attach the presented token
    pub fn with_token(mut self, token: PresentedToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Attach the user resolved from the token
    pub fn with_authenticated_user(mut self, user: AuthenticatedUser) -> Self {
        self.authenticated_user = Some(user);
        self
    }

    /// Attach the client resolved from the token
    pub fn with_authenticated_client(mut self, client: ClientRepresentation) -> Self {
        self.authenticated_client = Some(client);
        self
    }

    /// Attach the network origin of the request
    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn event(&self) -> ClientPolicyEvent {
        self.payload.event()
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn token(&self) -> Option<&PresentedToken> {
        self.token.as_ref()
    }

    pub fn authenticated_user(&self) -> Option<&AuthenticatedUser> {
        self.authenticated_user.as_ref()
    }

    pub fn authenticated_client(&self) -> Option<&ClientRepresentation> {
        self.authenticated_client.as_ref()
    }

    pub fn origin(&self) -> &RequestOrigin {
        &self.origin
    }

    /// Client metadata proposed by the caller
    pub fn proposed_representation(&self) -> Option<&ClientRepresentation> {
        match &self.payload {
            EventPayload::Register { proposed }
            | EventPayload::Update { proposed, .. }
            | EventPayload::Registered { proposed, .. } => Some(proposed),
            EventPayload::View { .. } | EventPayload::Request { .. } => None,
        }
    }

    /// Mutable proposed representation; only registration and update expose one
    pub fn proposed_representation_mut(&mut self) -> Option<&mut ClientRepresentation> {
        match &mut self.payload {
            EventPayload::Register { proposed } | EventPayload::Update { proposed, .. } => {
                Some(proposed)
            }
            _ => None,
        }
    }

    /// Already persisted client
    pub fn registered_client(&self) -> Option<&ClientRepresentation> {
        match &self.payload {
            EventPayload::Register { .. } => None,
            EventPayload::Update { registered, .. }
            | EventPayload::Registered { registered, .. }
            | EventPayload::View { registered }
            | EventPayload::Request { registered, .. } => Some(registered),
        }
    }

    pub fn request_parameters(&self) -> Option<&RequestParameters> {
        match &self.payload {
            EventPayload::Request { parameters, .. } => Some(parameters),
            _ => None,
        }
    }

    /// Client the event is about: proposed, then persisted, then authenticated
    pub fn bound_client(&self) -> Option<&ClientRepresentation> {
        self.proposed_representation()
            .or_else(|| self.registered_client())
            .or(self.authenticated_client.as_ref())
    }

    /// Consume the context, returning the (possibly augmented) proposed representation
    pub fn into_proposed_representation(self) -> Option<ClientRepresentation> {
        match self.payload {
            EventPayload::Register { proposed }
            | EventPayload::Update { proposed, .. }
            | EventPayload::Registered { proposed, .. } => Some(proposed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::authenticator;

    fn realm() -> Realm {
        Realm::new("test")
    }

    #[test]
    fn test_register_context_is_mutable() {
        let mut ctx = PolicyContext::register(realm(), ClientRepresentation::new("app"));
        assert_eq!(ctx.event(), ClientPolicyEvent::ClientRegister);
        assert!(ctx.registered_client().is_none());

        ctx.proposed_representation_mut()
            .unwrap()
            .client_authenticator_type = Some(authenticator::CLIENT_X509.to_string());

        let proposed = ctx.into_proposed_representation().unwrap();
        assert_eq!(proposed.authenticator(), authenticator::CLIENT_X509);
    }

    #[test]
    fn test_registered_context_is_read_only() {
        let client = ClientRepresentation::new("app");
        let mut ctx = PolicyContext::registered(realm(), client.clone(), client);
        assert_eq!(ctx.event(), ClientPolicyEvent::ClientRegistered);
        assert!(ctx.proposed_representation().is_some());
        assert!(ctx.proposed_representation_mut().is_none());
    }

    #[test]
    fn test_request_context_rejects_registration_event() {
        let result = PolicyContext::request(
            ClientPolicyEvent::ClientRegister,
            realm(),
            ClientRepresentation::new("app"),
            RequestParameters::new(),
        );
        assert!(matches!(result, Err(ContextError::NotRequestTime(_))));
    }

    #[test]
    fn test_request_context_serializes_for_audit() {
        let ctx = PolicyContext::request(
            ClientPolicyEvent::TokenRefresh,
            realm(),
            ClientRepresentation::new("app"),
            RequestParameters::new(),
        )
        .unwrap();

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["payload"]["event"], "request");
        assert_eq!(value["payload"]["request_event"], "TOKEN_REFRESH");
    }

    #[test]
    fn test_request_context_exposes_parameters() {
        let ctx = PolicyContext::request(
            ClientPolicyEvent::TokenRefresh,
            realm(),
            ClientRepresentation::new("app"),
            RequestParameters::new().with_scope("openid"),
        )
        .unwrap();
        assert_eq!(ctx.event(), ClientPolicyEvent::TokenRefresh);
        assert!(ctx.request_parameters().unwrap().has_scope("openid"));
        assert!(ctx.proposed_representation().is_none());
    }

    #[test]
    fn test_bound_client_precedence() {
        let registered = ClientRepresentation::new("old");
        let proposed = ClientRepresentation::new("new");
        let ctx = PolicyContext::update(realm(), registered, proposed);
        assert_eq!(ctx.bound_client().unwrap().client_id, "new");

        let view = PolicyContext::view(realm(), ClientRepresentation::new("viewed"));
        assert_eq!(view.bound_client().unwrap().client_id, "viewed");
    }
}
