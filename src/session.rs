//! Session Manager: opaque references binding requests to account ids.
//!
//! An explicit instance with injected expiry, not an ambient singleton, so
//! tests can run as many independent managers as they like. Raw tokens are
//! handed to the caller once and never retained; the map is keyed by the
//! token's SHA-256 hash, so a leaked map still yields no usable references.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const TOKEN_BYTES: usize = 32;

struct SessionEntry {
    account_id: Uuid,
    last_seen: Instant,
}

/// Issues, resolves, and invalidates session references.
pub struct SessionManager {
    ttl: Duration,
    entries: Mutex<HashMap<[u8; 32], SessionEntry>>,
}

impl SessionManager {
    /// `ttl` is a sliding window: each successful resolve restarts it.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh reference bound to `account_id`.
    ///
    /// 32 bytes of OS randomness, so well past the 128-bit unguessability
    /// floor. Expired entries are swept here rather than on a timer.
    ///
    /// # Errors
    /// Only when the OS rng fails.
    pub async fn issue(&self, account_id: Uuid) -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate session token")?;
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);
        entries.insert(
            hash_token(&token),
            SessionEntry {
                account_id,
                last_seen: Instant::now(),
            },
        );
        debug!(%account_id, sessions = entries.len(), "issued session");
        Ok(token)
    }

    /// Resolve a reference to its account id and extend its expiry.
    ///
    /// Unknown, expired, and tampered references all take the same path to
    /// the same `None`.
    pub async fn resolve(&self, reference: &str) -> Option<Uuid> {
        let key = hash_token(reference);
        let mut entries = self.entries.lock().await;
        match entries.get_mut(&key) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                entry.last_seen = Instant::now();
                Some(entry.account_id)
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Drop a reference. Idempotent: unknown references are a no-op.
    pub async fn invalidate(&self, reference: &str) {
        let key = hash_token(reference);
        let mut entries = self.entries.lock().await;
        if entries.remove(&key).is_some() {
            debug!("invalidated session");
        }
    }
}

fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn issue_then_resolve_round_trips() {
        let sessions = manager();
        let account_id = Uuid::new_v4();
        let reference = sessions.issue(account_id).await.expect("issue");
        assert_eq!(sessions.resolve(&reference).await, Some(account_id));
    }

    #[tokio::test]
    async fn references_are_unique_and_unguessable_length() {
        let sessions = manager();
        let account_id = Uuid::new_v4();
        let first = sessions.issue(account_id).await.expect("issue");
        let second = sessions.issue(account_id).await.expect("issue");
        assert_ne!(first, second);
        let decoded = URL_SAFE_NO_PAD.decode(&first).expect("base64");
        assert_eq!(decoded.len(), TOKEN_BYTES);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let sessions = manager();
        let reference = sessions.issue(Uuid::new_v4()).await.expect("issue");
        sessions.invalidate(&reference).await;
        assert_eq!(sessions.resolve(&reference).await, None);
        // Second invalidate of the same reference is a no-op, not an error.
        sessions.invalidate(&reference).await;
        sessions.invalidate("never-issued").await;
    }

    #[tokio::test]
    async fn tampered_reference_resolves_to_none() {
        let sessions = manager();
        let reference = sessions.issue(Uuid::new_v4()).await.expect("issue");
        let mut tampered = reference.clone();
        tampered.push('x');
        assert_eq!(sessions.resolve(&tampered).await, None);
        // The original still works.
        assert!(sessions.resolve(&reference).await.is_some());
    }

    #[tokio::test]
    async fn expired_session_resolves_to_none() {
        let sessions = SessionManager::new(Duration::ZERO);
        let reference = sessions.issue(Uuid::new_v4()).await.expect("issue");
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(sessions.resolve(&reference).await, None);
    }

    #[tokio::test]
    async fn resolve_slides_the_expiry_window() {
        let sessions = SessionManager::new(Duration::from_millis(400));
        let reference = sessions.issue(Uuid::new_v4()).await.expect("issue");
        // Keep touching the session at under-ttl intervals for longer than
        // one ttl in total; the slide keeps it alive.
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert!(sessions.resolve(&reference).await.is_some());
        }
    }

    #[tokio::test]
    async fn independent_managers_do_not_share_state() {
        let a = manager();
        let b = manager();
        let reference = a.issue(Uuid::new_v4()).await.expect("issue");
        assert_eq!(b.resolve(&reference).await, None);
    }
}
