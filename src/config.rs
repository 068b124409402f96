//! Process-wide configuration for the authentication core.
//!
//! Loaded once at startup and shared read-only across requests; nothing in
//! here is mutated at runtime. Sensitive material (the reversible key,
//! federated client secrets) is wrapped in [`secrecy`] types so it stays out
//! of `Debug` output.

use secrecy::{SecretBox, SecretString};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Default bcrypt cost: ten doublings of the base work factor, matching the
/// salt-rounds setting the application has always shipped with.
pub const DEFAULT_ADAPTIVE_COST: u32 = 10;

/// How plaintext secrets are turned into stored credentials.
///
/// Only [`CredentialPolicy::SaltedAdaptive`] is fit for production. The other
/// two exist for compatibility with records produced by the earlier variants
/// of the application and carry `Insecure` in their names on purpose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Per-call random salt plus an adaptive work-factor hash (bcrypt).
    #[default]
    SaltedAdaptive,
    /// Single unsalted SHA-256. Identical plaintexts produce identical
    /// stored forms, so correlation and rainbow-table attacks apply.
    DigestInsecure,
    /// Symmetric encryption under the process-wide key. Anyone holding the
    /// key can recover every plaintext; losing the key invalidates every
    /// stored credential.
    ReversibleInsecure,
}

/// OAuth client material for one federated provider. The handshake itself
/// happens outside the core; this only gates which provider names the
/// reconciler will accept assertions from.
#[derive(Debug)]
pub struct ProviderCredentials {
    client_id: String,
    client_secret: SecretString,
    callback_url: String,
}

impl ProviderCredentials {
    #[must_use]
    pub fn new(client_id: String, client_secret: SecretString, callback_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            callback_url,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

/// Configuration consumed by [`crate::core::AuthCore`].
#[derive(Debug, Default)]
pub struct CoreConfig {
    credential_policy: CredentialPolicy,
    adaptive_cost: Option<u32>,
    reversible_key: Option<SecretBox<[u8; 32]>>,
    session_ttl: Option<Duration>,
    providers: HashMap<String, ProviderCredentials>,
}

impl CoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential_policy(mut self, policy: CredentialPolicy) -> Self {
        self.credential_policy = policy;
        self
    }

    /// Cost factor for the salted-adaptive policy. Each increment doubles
    /// the work; bcrypt accepts 4..=31.
    #[must_use]
    pub fn with_adaptive_cost(mut self, cost: u32) -> Self {
        self.adaptive_cost = Some(cost);
        self
    }

    /// Process-wide key for the reversible policy. Required when that policy
    /// is selected; ignored otherwise.
    #[must_use]
    pub fn with_reversible_key(mut self, key: [u8; 32]) -> Self {
        self.reversible_key = Some(SecretBox::new(Box::new(key)));
        self
    }

    /// Sliding session expiry. Every successful resolve restarts the clock.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    /// Register a federated provider the reconciler may accept assertions
    /// from. Unregistered provider names fail with `InvalidAssertion`.
    #[must_use]
    pub fn with_provider(mut self, name: String, credentials: ProviderCredentials) -> Self {
        self.providers.insert(name, credentials);
        self
    }

    #[must_use]
    pub fn credential_policy(&self) -> CredentialPolicy {
        self.credential_policy
    }

    #[must_use]
    pub fn adaptive_cost(&self) -> u32 {
        self.adaptive_cost.unwrap_or(DEFAULT_ADAPTIVE_COST)
    }

    #[must_use]
    pub fn reversible_key(&self) -> Option<&SecretBox<[u8; 32]>> {
        self.reversible_key.as_ref()
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS))
    }

    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderCredentials> {
        self.providers.get(name)
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}
