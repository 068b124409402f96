//! Account model and the persistence seam the core depends on.
//!
//! The core never talks to a database directly; it goes through
//! [`AccountStore`], which any document store reachable by key lookup can
//! implement. The in-memory implementation in [`memory`] is the reference
//! and the test backend.

mod memory;

pub use memory::MemoryAccountStore;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StoreError;

/// A registered account.
///
/// `credential` is the codec-produced stored form, never the plaintext, and
/// is absent on accounts created purely via federated login.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub identifier: String,
    pub credential: Option<String>,
    /// Provider name to provider-scoped external id. At most one entry per
    /// provider; entries are append-only (a provider id is a permanent link).
    pub federated_ids: HashMap<String, String>,
    pub display_name: Option<String>,
    pub secret_payload: Option<String>,
}

impl Account {
    /// Whether this account can authenticate through the local strategy.
    #[must_use]
    pub fn has_local_credential(&self) -> bool {
        self.credential.is_some()
    }
}

/// One row of the community wall projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommunitySecret {
    pub identifier: String,
    pub secret: String,
}

/// Persistence contract for accounts.
///
/// Implementations must serialize concurrent `create` calls on one
/// identifier (at most one succeeds) and concurrent
/// `find_or_create_federated` calls on one `(provider, external_id)` pair
/// (exactly one account results). No ordering is required across distinct
/// accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account. Fails with [`StoreError::Duplicate`] when the
    /// identifier is taken; the existing account is untouched.
    async fn create(
        &self,
        identifier: &str,
        credential: Option<String>,
    ) -> Result<Account, StoreError>;

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Replace the account's secret payload. Fails with
    /// [`StoreError::NotFound`] when the id is unknown.
    async fn set_secret_payload(&self, id: Uuid, value: &str) -> Result<Account, StoreError>;

    /// Atomic find-or-create keyed by `(provider, external_id)`.
    ///
    /// Idempotent: repeated calls return the same account and refresh only
    /// the display name.
    async fn find_or_create_federated(
        &self,
        provider: &str,
        external_id: &str,
        display_name: Option<&str>,
    ) -> Result<Account, StoreError>;

    /// Append a federated link to an existing account.
    ///
    /// Idempotent when the same `(provider, external_id)` is already linked.
    /// Fails with [`StoreError::Duplicate`] when the provider slot holds a
    /// different external id (links are permanent) or when the pair already
    /// belongs to another account.
    async fn attach_federated_id(
        &self,
        id: Uuid,
        provider: &str,
        external_id: &str,
    ) -> Result<Account, StoreError>;

    /// Accounts that have submitted a secret, projected for rendering.
    async fn accounts_with_secret(&self) -> Result<Vec<CommunitySecret>, StoreError>;
}
