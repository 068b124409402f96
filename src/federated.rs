//! Federated Identity Reconciler: maps trusted provider assertions to local
//! accounts.
//!
//! The OAuth/OIDC handshake happens outside the core; by the time an
//! assertion arrives here it has already been cryptographically validated.
//! This module never sees a plaintext secret. Distinct providers always map
//! to distinct accounts unless the caller explicitly links them; there is
//! no automatic cross-provider merge.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::account::{Account, AccountStore};
use crate::error::AuthError;

/// An externally validated statement that a user controls `external_id` at
/// `provider`.
#[derive(Clone, Debug)]
pub struct FederatedAssertion {
    pub provider: String,
    pub external_id: String,
    pub display_name: Option<String>,
}

impl FederatedAssertion {
    #[must_use]
    pub fn new(provider: &str, external_id: &str, display_name: Option<&str>) -> Self {
        Self {
            provider: provider.trim().to_string(),
            external_id: external_id.trim().to_string(),
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}

pub struct FederatedReconciler<S> {
    store: Arc<S>,
    /// Provider names with configured credentials; assertions from anyone
    /// else are refused rather than minting a garbage account.
    known_providers: HashSet<String>,
}

impl<S: AccountStore> FederatedReconciler<S> {
    #[must_use]
    pub fn new(store: Arc<S>, known_providers: Vec<String>) -> Self {
        Self {
            store,
            known_providers: known_providers.into_iter().collect(),
        }
    }

    /// Resolve an assertion to its account, creating one on first login.
    pub async fn reconcile(&self, assertion: &FederatedAssertion) -> Result<Account, AuthError> {
        self.check(assertion)?;
        let account = self
            .store
            .find_or_create_federated(
                &assertion.provider,
                &assertion.external_id,
                assertion.display_name.as_deref(),
            )
            .await?;
        info!(
            account_id = %account.id,
            provider = %assertion.provider,
            "federated login reconciled"
        );
        Ok(account)
    }

    /// Link a provider identity to an existing account, the explicit merge
    /// hint. Without this call, each provider keeps its own account.
    pub async fn link(
        &self,
        account_id: Uuid,
        assertion: &FederatedAssertion,
    ) -> Result<Account, AuthError> {
        self.check(assertion)?;
        let account = self
            .store
            .attach_federated_id(account_id, &assertion.provider, &assertion.external_id)
            .await?;
        info!(
            %account_id,
            provider = %assertion.provider,
            "federated identity linked"
        );
        Ok(account)
    }

    fn check(&self, assertion: &FederatedAssertion) -> Result<(), AuthError> {
        if assertion.provider.is_empty() || assertion.external_id.is_empty() {
            return Err(AuthError::InvalidAssertion);
        }
        if !self.known_providers.contains(&assertion.provider) {
            warn!(provider = %assertion.provider, "assertion from unconfigured provider");
            return Err(AuthError::InvalidAssertion);
        }
        Ok(())
    }
}
