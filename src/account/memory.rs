//! In-memory account store.
//!
//! A single mutex guards the account map and both lookup indexes, which is
//! what gives `create` and `find_or_create_federated` their atomicity: every
//! uniqueness check and insert happens under one lock acquisition. Lock hold
//! times are map operations only; the slow work (hashing) happens outside
//! the store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Account, AccountStore, CommunitySecret};
use crate::error::StoreError;

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    by_identifier: HashMap<String, Uuid>,
    by_federated: HashMap<(String, String), Uuid>,
}

/// Reference [`AccountStore`] backed by process memory.
#[derive(Default)]
pub struct MemoryAccountStore {
    state: Mutex<State>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn insert(&mut self, account: Account) {
        self.by_identifier
            .insert(account.identifier.clone(), account.id);
        for (provider, external_id) in &account.federated_ids {
            self.by_federated
                .insert((provider.clone(), external_id.clone()), account.id);
        }
        self.accounts.insert(account.id, account);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(
        &self,
        identifier: &str,
        credential: Option<String>,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        if state.by_identifier.contains_key(identifier) {
            return Err(StoreError::Duplicate);
        }
        let account = Account {
            id: Uuid::new_v4(),
            identifier: identifier.to_string(),
            credential,
            federated_ids: HashMap::new(),
            display_name: None,
            secret_payload: None,
        };
        state.insert(account.clone());
        Ok(account)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .by_identifier
            .get(identifier)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn set_secret_payload(&self, id: Uuid, value: &str) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        let account = state.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.secret_payload = Some(value.to_string());
        Ok(account.clone())
    }

    async fn find_or_create_federated(
        &self,
        provider: &str,
        external_id: &str,
        display_name: Option<&str>,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        let key = (provider.to_string(), external_id.to_string());

        if let Some(id) = state.by_federated.get(&key).copied() {
            let account = state.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
            if let Some(name) = display_name {
                account.display_name = Some(name.to_string());
            }
            return Ok(account.clone());
        }

        // Synthesized identifier keeps federated accounts out of the local
        // identifier namespace.
        let identifier = format!("{provider}:{external_id}");
        if state.by_identifier.contains_key(&identifier) {
            return Err(StoreError::Duplicate);
        }
        let account = Account {
            id: Uuid::new_v4(),
            identifier,
            credential: None,
            federated_ids: HashMap::from([(provider.to_string(), external_id.to_string())]),
            display_name: display_name.map(str::to_string),
            secret_payload: None,
        };
        state.insert(account.clone());
        Ok(account)
    }

    async fn attach_federated_id(
        &self,
        id: Uuid,
        provider: &str,
        external_id: &str,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        let key = (provider.to_string(), external_id.to_string());

        match state.by_federated.get(&key) {
            Some(owner) if *owner == id => {
                // Already linked here; attach is idempotent.
                return state.accounts.get(&id).cloned().ok_or(StoreError::NotFound);
            }
            Some(_) => return Err(StoreError::Duplicate),
            None => {}
        }

        let account = state.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        match account.federated_ids.get(provider) {
            // The provider slot is permanent once written.
            Some(existing) if existing.as_str() != external_id => Err(StoreError::Duplicate),
            _ => {
                account
                    .federated_ids
                    .insert(provider.to_string(), external_id.to_string());
                let account = account.clone();
                state.by_federated.insert(key, id);
                Ok(account)
            }
        }
    }

    async fn accounts_with_secret(&self) -> Result<Vec<CommunitySecret>, StoreError> {
        let state = self.state.lock().await;
        let mut wall: Vec<CommunitySecret> = state
            .accounts
            .values()
            .filter_map(|account| {
                account.secret_payload.as_ref().map(|secret| CommunitySecret {
                    identifier: account.identifier.clone(),
                    secret: secret.clone(),
                })
            })
            .collect();
        wall.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(wall)
    }
}
