//! `AuthCore`: the surface the presentation layer calls.
//!
//! Wires the credential codec, account store, local strategy, federated
//! reconciler, and session manager together. Every successful authentication
//! path (local register, local login, federated login) terminates in the
//! session manager issuing a reference bound to the account id.

use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::account::{AccountStore, CommunitySecret};
use crate::config::CoreConfig;
use crate::credential::CredentialCodec;
use crate::error::AuthError;
use crate::federated::{FederatedAssertion, FederatedReconciler};
use crate::local::LocalAuthenticator;
use crate::session::SessionManager;

/// What a successful authentication hands back: the identity and the opaque
/// token proving it on later requests.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub account_id: Uuid,
    pub reference: String,
}

pub struct AuthCore<S> {
    store: Arc<S>,
    local: LocalAuthenticator<S>,
    federated: FederatedReconciler<S>,
    sessions: SessionManager,
}

impl<S: AccountStore> AuthCore<S> {
    /// Build the core from configuration and a persistence backend.
    ///
    /// # Errors
    /// Fails on configuration mistakes (bad cost factor, missing reversible
    /// key) before any request is served.
    pub fn new(config: &CoreConfig, store: S) -> anyhow::Result<Self> {
        let store = Arc::new(store);
        let codec =
            Arc::new(CredentialCodec::from_config(config).context("failed to build codec")?);
        let local = LocalAuthenticator::new(Arc::clone(&store), codec)?;
        let federated = FederatedReconciler::new(Arc::clone(&store), config.provider_names());
        let sessions = SessionManager::new(config.session_ttl());
        Ok(Self {
            store,
            local,
            federated,
            sessions,
        })
    }

    /// Register a local account and log it in. One step, no separate login.
    pub async fn register_local(
        &self,
        identifier: &str,
        plaintext: &str,
    ) -> Result<SessionHandle, AuthError> {
        let account = self.local.register(identifier, plaintext).await?;
        self.open_session(account.id).await
    }

    /// Authenticate with a local credential.
    pub async fn login_local(
        &self,
        identifier: &str,
        plaintext: &str,
    ) -> Result<SessionHandle, AuthError> {
        let account = self.local.authenticate(identifier, plaintext).await?;
        self.open_session(account.id).await
    }

    /// Authenticate with a federated assertion (already validated upstream).
    pub async fn login_federated(
        &self,
        provider: &str,
        external_id: &str,
        display_name: Option<&str>,
    ) -> Result<SessionHandle, AuthError> {
        let assertion = FederatedAssertion::new(provider, external_id, display_name);
        let account = self.federated.reconcile(&assertion).await?;
        self.open_session(account.id).await
    }

    /// Link one more provider identity to an already-known account.
    pub async fn link_federated(
        &self,
        account_id: Uuid,
        provider: &str,
        external_id: &str,
    ) -> Result<(), AuthError> {
        let assertion = FederatedAssertion::new(provider, external_id, None);
        self.federated.link(account_id, &assertion).await?;
        Ok(())
    }

    /// Resolve a session reference into the account it authenticates as.
    pub async fn current_account(&self, reference: &str) -> Option<Uuid> {
        self.sessions.resolve(reference).await
    }

    /// End a session. Idempotent.
    pub async fn logout(&self, reference: &str) {
        self.sessions.invalidate(reference).await;
    }

    /// Store the authenticated user's submitted secret.
    pub async fn set_secret(&self, account_id: Uuid, text: &str) -> Result<(), AuthError> {
        self.store.set_secret_payload(account_id, text).await?;
        Ok(())
    }

    /// The community wall: every account that has shared a secret.
    pub async fn accounts_with_secret(&self) -> Result<Vec<CommunitySecret>, AuthError> {
        Ok(self.store.accounts_with_secret().await?)
    }

    async fn open_session(&self, account_id: Uuid) -> Result<SessionHandle, AuthError> {
        let reference = self
            .sessions
            .issue(account_id)
            .await
            .map_err(AuthError::Internal)?;
        Ok(SessionHandle {
            account_id,
            reference,
        })
    }
}
