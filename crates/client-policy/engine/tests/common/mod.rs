//! Shared fixtures: an admin-style harness over the in-memory store and
//! helpers driving the client lifecycle through the manager.

#![allow(dead_code)]

use client_policy_engine::{
    ClientPolicyError, ClientPolicyManager, EngineConfig, EvaluationCard, InMemoryComponentStore,
};
use client_policy_types::{
    policy_keys, provider_type, ClientRepresentation, ComponentRecord, PolicyContext,
    PresentedToken, Realm, RequestOrigin, RequestParameters,
};
use std::net::IpAddr;
use std::sync::Arc;

pub const REALM: &str = "test";

/// RFC 7636 appendix B verifier and its S256 challenge
pub const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
pub const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn realm() -> Realm {
    Realm::new(REALM)
}

/// Admin API stand-in plus a manager reading the same store
pub struct Harness {
    pub store: Arc<InMemoryComponentStore>,
    pub manager: ClientPolicyManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryComponentStore::new());
        let manager = ClientPolicyManager::new(store.clone(), config);
        Self { store, manager }
    }

    // -----------------------------------------------------------------------
    // Component administration
    // -----------------------------------------------------------------------

    pub fn create_policy(&self, name: &str) -> String {
        self.store
            .add(ComponentRecord::policy(name, REALM))
            .unwrap()
    }

    pub fn create_condition(&self, name: &str, provider_id: &str, config: &[(&str, &[&str])]) -> String {
        let mut record = ComponentRecord::condition(name, REALM, provider_id);
        for (key, values) in config {
            record = record.with_config(*key, values.iter().copied());
        }
        self.store.add(record).unwrap()
    }

    pub fn create_executor(&self, name: &str, provider_id: &str, config: &[(&str, &[&str])]) -> String {
        let mut record = ComponentRecord::executor(name, REALM, provider_id);
        for (key, values) in config {
            record = record.with_config(*key, values.iter().copied());
        }
        self.store.add(record).unwrap()
    }

    pub fn get(&self, kind: &str, name: &str) -> ComponentRecord {
        use client_policy_engine::ComponentStore;
        self.store
            .find_component(REALM, kind, name)
            .unwrap()
            .unwrap_or_else(|| panic!("no {kind} named {name}"))
    }

    pub fn register_condition(&self, condition: &str, policy: &str) {
        let id = self.get(provider_type::CONDITION, condition).id;
        let mut record = self.get(provider_type::POLICY, policy);
        record.config.add(policy_keys::CONDITION_IDS, id);
        self.store.update(record).unwrap();
    }

    pub fn register_executor(&self, executor: &str, policy: &str) {
        let id = self.get(provider_type::EXECUTOR, executor).id;
        let mut record = self.get(provider_type::POLICY, policy);
        record.config.add(policy_keys::EXECUTOR_IDS, id);
        self.store.update(record).unwrap();
    }

    /// Replace one configuration entry of a condition or executor
    pub fn update_component(&self, kind: &str, name: &str, key: &str, values: &[&str]) {
        let mut record = self.get(kind, name);
        record
            .config
            .put(key, values.iter().map(|v| v.to_string()).collect());
        self.store.update(record).unwrap();
    }

    pub fn delete_condition(&self, condition: &str, policy: &str) {
        let id = self.get(provider_type::CONDITION, condition).id;
        self.store.remove(&id).unwrap();
        let mut record = self.get(provider_type::POLICY, policy);
        record.config.remove_value(policy_keys::CONDITION_IDS, &id);
        self.store.update(record).unwrap();
    }

    pub fn delete_executor(&self, executor: &str, policy: &str) {
        let id = self.get(provider_type::EXECUTOR, executor).id;
        self.store.remove(&id).unwrap();
        let mut record = self.get(provider_type::POLICY, policy);
        record.config.remove_value(policy_keys::EXECUTOR_IDS, &id);
        self.store.update(record).unwrap();
    }

    /// Remove a policy together with its conditions and executors
    pub fn delete_policy(&self, policy: &str) {
        let record = self.get(provider_type::POLICY, policy);
        for id in record.condition_ids().iter().chain(record.executor_ids()) {
            let _ = self.store.remove(id);
        }
        self.store.remove(&record.id).unwrap();
    }

    // -----------------------------------------------------------------------
    // Client lifecycle
    // -----------------------------------------------------------------------

    /// Register a client, returning the representation the caller persists
    pub fn register_client(&self, client: ClientRepresentation) -> Result<ClientRepresentation, ClientPolicyError> {
        self.register_client_with(PolicyContext::register(realm(), client))
    }

    /// Register with a prepared context (token, user, origin)
    pub fn register_client_with(&self, mut ctx: PolicyContext) -> Result<ClientRepresentation, ClientPolicyError> {
        let original = ctx.proposed_representation().cloned();
        self.manager.trigger(&mut ctx)?;
        let persisted = ctx
            .into_proposed_representation()
            .expect("registration context carries a representation");

        // Post-commit notification must never fail the registration
        let mut registered = PolicyContext::registered(
            realm(),
            original.unwrap_or_else(|| persisted.clone()),
            persisted.clone(),
        );
        let card = self.manager.trigger(&mut registered).expect("post-commit never fails");
        assert!(card.diagnostics.iter().all(|d| !d.is_empty()));

        Ok(persisted)
    }

    pub fn update_client(
        &self,
        registered: &ClientRepresentation,
        proposed: ClientRepresentation,
    ) -> Result<ClientRepresentation, ClientPolicyError> {
        let mut ctx = PolicyContext::update(realm(), registered.clone(), proposed)
            .with_token(PresentedToken::registration_access(&registered.client_id));
        self.manager.trigger(&mut ctx)?;
        Ok(ctx
            .into_proposed_representation()
            .expect("update context carries a representation"))
    }

    pub fn view_client(&self, registered: &ClientRepresentation) -> Result<EvaluationCard, ClientPolicyError> {
        let mut ctx = PolicyContext::view(realm(), registered.clone());
        self.manager.trigger(&mut ctx)
    }

    pub fn authorize(
        &self,
        client: &ClientRepresentation,
        params: RequestParameters,
    ) -> Result<EvaluationCard, ClientPolicyError> {
        let mut ctx = PolicyContext::authorization_request(realm(), client.clone(), params);
        self.manager.trigger(&mut ctx)
    }

    pub fn token(
        &self,
        client: &ClientRepresentation,
        params: RequestParameters,
        address: Option<&str>,
    ) -> Result<EvaluationCard, ClientPolicyError> {
        let mut ctx = PolicyContext::token_request(realm(), client.clone(), params);
        if let Some(address) = address {
            let ip: IpAddr = address.parse().unwrap();
            ctx = ctx.with_origin(RequestOrigin::from_address(ip));
        }
        self.manager.trigger(&mut ctx)
    }

    /// Authorization code flow following PKCE: both requests must pass
    pub fn login_with_pkce(&self, client: &ClientRepresentation, address: Option<&str>) -> Result<(), ClientPolicyError> {
        self.authorize(client, pkce_authorization())?;
        self.token(client, pkce_token(), address)?;
        Ok(())
    }

    /// Authorization code flow without PKCE parameters
    pub fn login_without_pkce(&self, client: &ClientRepresentation, address: Option<&str>) -> Result<(), ClientPolicyError> {
        self.authorize(client, plain_authorization())?;
        self.token(client, RequestParameters::new(), address)?;
        Ok(())
    }
}

pub fn plain_authorization() -> RequestParameters {
    RequestParameters::new()
        .with_response_type("code")
        .with_scope("openid")
        .with_state("af0ifjsldkj")
        .with_nonce("n-0S6_WzA2Mj")
}

pub fn pkce_authorization() -> RequestParameters {
    plain_authorization().with_code_challenge(CHALLENGE, "S256")
}

pub fn pkce_token() -> RequestParameters {
    RequestParameters::new()
        .with_code_verifier(VERIFIER)
        .with_issued_code_challenge(CHALLENGE, "S256")
}

/// Confidential client as created through the admin console
pub fn confidential_client(client_id: &str) -> ClientRepresentation {
    let mut client = ClientRepresentation::new(client_id)
        .with_public_client(false)
        .with_bearer_only(false);
    client.name = Some(client_id.to_string());
    client.service_accounts_enabled = Some(true);
    client.redirect_uris = vec!["https://localhost:8543/auth/realms/master/app/auth".to_string()];
    client
}

/// Description of a policy violation, panicking on any other outcome
pub fn violation_description<T: std::fmt::Debug>(result: Result<T, ClientPolicyError>) -> String {
    match result {
        Err(ClientPolicyError::Violation(violation)) => violation.error_description,
        other => panic!("expected a policy violation, got {other:?}"),
    }
}
