//! Local Authentication Strategy: (identifier, plaintext) registration and
//! verification.
//!
//! The reject path is deliberately uniform. Unknown identifier, account
//! without a local credential, and wrong secret all cost one codec
//! verification and return the one `InvalidCredentials` value, so response
//! content and timing give away nothing about which accounts exist.

use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};

use crate::account::{Account, AccountStore};
use crate::credential::CredentialCodec;
use crate::error::AuthError;

pub struct LocalAuthenticator<S> {
    store: Arc<S>,
    codec: Arc<CredentialCodec>,
    /// Verified in place of a real credential when the lookup misses, to
    /// keep both reject paths doing the same work.
    decoy: String,
}

impl<S: AccountStore> LocalAuthenticator<S> {
    /// # Errors
    /// Fails only if the decoy credential cannot be encoded at startup.
    pub fn new(store: Arc<S>, codec: Arc<CredentialCodec>) -> anyhow::Result<Self> {
        let decoy = codec
            .encode("confidant-decoy-credential")
            .context("failed to encode decoy credential")?;
        Ok(Self {
            store,
            codec,
            decoy,
        })
    }

    /// Register a new account and return it already authenticated.
    pub async fn register(&self, identifier: &str, plaintext: &str) -> Result<Account, AuthError> {
        let identifier = normalize_identifier(identifier);
        let credential = self
            .codec
            .encode(plaintext)
            .map_err(AuthError::Internal)?;
        let account = self.store.create(&identifier, Some(credential)).await?;
        info!(account_id = %account.id, %identifier, "registered account");
        Ok(account)
    }

    /// Answer "does (identifier, plaintext) authenticate?".
    pub async fn authenticate(
        &self,
        identifier: &str,
        plaintext: &str,
    ) -> Result<Account, AuthError> {
        let identifier = normalize_identifier(identifier);
        let account = self.store.find_by_identifier(&identifier).await?;

        let stored = account
            .as_ref()
            .and_then(|account| account.credential.as_deref())
            .unwrap_or(&self.decoy);
        let matched = self.codec.verify(plaintext, stored);

        match account {
            Some(account) if account.has_local_credential() && matched => {
                debug!(account_id = %account.id, "local authentication succeeded");
                Ok(account)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Identifiers are matched case-insensitively and without stray whitespace.
fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
