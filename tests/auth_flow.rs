//! End-to-end flows through `AuthCore` and the concurrency guarantees of the
//! store seam.

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use uuid::Uuid;

use confidant::{
    Account, AccountStore, AuthCore, AuthError, CommunitySecret, CoreConfig, CredentialPolicy,
    MemoryAccountStore, ProviderCredentials, StoreError,
};

fn init_tracing() {
    // Honors RUST_LOG when set; repeat calls are fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn test_config() -> CoreConfig {
    init_tracing();
    // Low cost keeps bcrypt fast in tests; semantics are unchanged.
    CoreConfig::new().with_adaptive_cost(4).with_provider(
        "google".to_string(),
        ProviderCredentials::new(
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
            "https://app.example.com/auth/google/callback".to_string(),
        ),
    )
}

fn core() -> AuthCore<MemoryAccountStore> {
    AuthCore::new(&test_config(), MemoryAccountStore::new()).expect("core builds")
}

#[tokio::test]
async fn register_login_share_secret_flow() -> Result<()> {
    let core = core();

    let registered = core.register_local("a@x.com", "hunter2").await?;
    // Registration logs the user in; the session is live immediately.
    assert_eq!(
        core.current_account(&registered.reference).await,
        Some(registered.account_id)
    );

    let login = core.login_local("a@x.com", "hunter2").await?;
    assert_eq!(login.account_id, registered.account_id);

    let wrong = core.login_local("a@x.com", "wrong").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    core.set_secret(registered.account_id, "my secret").await?;
    let wall = core.accounts_with_secret().await?;
    assert_eq!(
        wall,
        vec![CommunitySecret {
            identifier: "a@x.com".to_string(),
            secret: "my secret".to_string(),
        }]
    );

    // The projection is what the presentation layer renders; it must
    // serialize with exactly these field names and nothing else.
    assert_eq!(
        serde_json::to_value(&wall)?,
        serde_json::json!([{ "identifier": "a@x.com", "secret": "my secret" }])
    );

    Ok(())
}

#[tokio::test]
async fn unknown_identifier_and_wrong_secret_are_indistinguishable() -> Result<()> {
    let core = core();
    core.register_local("a@x.com", "hunter2").await?;

    let unknown = core
        .login_local("nobody@x.com", "hunter2")
        .await
        .expect_err("unknown identifier");
    let wrong = core
        .login_local("a@x.com", "wrong")
        .await
        .expect_err("wrong secret");
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_refused() -> Result<()> {
    let core = core();
    core.register_local("a@x.com", "hunter2").await?;
    let second = core.register_local("a@x.com", "different").await;
    assert!(matches!(second, Err(AuthError::DuplicateAccount)));
    // The original credential is unaffected.
    assert!(core.login_local("a@x.com", "hunter2").await.is_ok());
    Ok(())
}

#[tokio::test]
async fn logout_invalidates_and_is_idempotent() -> Result<()> {
    let core = core();
    let session = core.register_local("a@x.com", "hunter2").await?;

    core.logout(&session.reference).await;
    assert_eq!(core.current_account(&session.reference).await, None);
    // A second logout of the same reference is a no-op.
    core.logout(&session.reference).await;

    Ok(())
}

#[tokio::test]
async fn federated_accounts_are_not_locally_loginable() -> Result<()> {
    let core = core();

    let session = core
        .login_federated("google", "g123", Some("Alice"))
        .await?;
    assert_eq!(
        core.current_account(&session.reference).await,
        Some(session.account_id)
    );

    // No local credential exists, so no local identifier matches.
    let local = core.login_local("g123", "anything").await;
    assert!(matches!(local, Err(AuthError::InvalidCredentials)));
    let synthesized = core.login_local("google:g123", "anything").await;
    assert!(matches!(synthesized, Err(AuthError::InvalidCredentials)));

    // Repeat federated login lands on the same account.
    let again = core.login_federated("google", "g123", Some("Alice")).await?;
    assert_eq!(again.account_id, session.account_id);

    Ok(())
}

#[tokio::test]
async fn malformed_assertion_fails_without_side_effects() -> Result<()> {
    let core = core();
    let missing_id = core.login_federated("google", "", Some("Alice")).await;
    assert!(matches!(missing_id, Err(AuthError::InvalidAssertion)));
    let unknown_provider = core.login_federated("myspace", "m1", None).await;
    assert!(matches!(unknown_provider, Err(AuthError::InvalidAssertion)));
    Ok(())
}

#[tokio::test]
async fn federated_link_is_append_only() -> Result<()> {
    let core = core();
    let session = core.register_local("a@x.com", "hunter2").await?;

    core.link_federated(session.account_id, "google", "g123")
        .await?;
    // Same link again: idempotent.
    core.link_federated(session.account_id, "google", "g123")
        .await?;
    // A different external id for the linked provider is refused.
    let overwrite = core
        .link_federated(session.account_id, "google", "g999")
        .await;
    assert!(matches!(overwrite, Err(AuthError::DuplicateAccount)));

    // The linked identity now logs into the existing account.
    let federated = core.login_federated("google", "g123", None).await?;
    assert_eq!(federated.account_id, session.account_id);

    Ok(())
}

#[tokio::test]
async fn concurrent_federated_logins_converge_on_one_account() -> Result<()> {
    let store = Arc::new(MemoryAccountStore::new());

    let mut tasks = Vec::new();
    for n in 0..16 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store
                .find_or_create_federated("google", "X", Some(&format!("Alice {n}")))
                .await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        let account = task.await.expect("join").expect("find_or_create");
        ids.push(account.id);
    }
    let first = ids[0];
    assert!(ids.iter().all(|id| *id == first));

    Ok(())
}

#[tokio::test]
async fn concurrent_creates_on_one_identifier_elect_one_winner() -> Result<()> {
    let store = Arc::new(MemoryAccountStore::new());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store.create("a@x.com", Some("stored".to_string())).await
        }));
    }

    let mut winners = 0;
    let mut duplicates = 0;
    for task in tasks {
        match task.await.expect("join") {
            Ok(_) => winners += 1,
            Err(StoreError::Duplicate) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(duplicates, 7);

    Ok(())
}

#[tokio::test]
async fn corrupted_credential_record_fails_closed() -> Result<()> {
    let store = MemoryAccountStore::new();
    // A record damaged at rest: not decodable under any policy.
    store
        .create("broken@x.com", Some("!!not-a-stored-form!!".to_string()))
        .await
        .expect("seed account");

    let core = AuthCore::new(&test_config(), store)?;
    let result = core.login_local("broken@x.com", "hunter2").await;
    // One bad row is a failed login, not a crash or a 500-class fault.
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn legacy_policies_round_trip_through_the_core() -> Result<()> {
    for policy in [
        CredentialPolicy::DigestInsecure,
        CredentialPolicy::ReversibleInsecure,
    ] {
        let config = test_config()
            .with_credential_policy(policy)
            .with_reversible_key([1u8; 32]);
        let core = AuthCore::new(&config, MemoryAccountStore::new())?;
        core.register_local("a@x.com", "hunter2").await?;
        assert!(core.login_local("a@x.com", "hunter2").await.is_ok());
        assert!(core.login_local("a@x.com", "wrong").await.is_err());
    }
    Ok(())
}

/// Store double standing in for an unreachable backend.
struct UnavailableStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl AccountStore for UnavailableStore {
    async fn create(&self, _: &str, _: Option<String>) -> Result<Account, StoreError> {
        Err(down())
    }

    async fn find_by_identifier(&self, _: &str) -> Result<Option<Account>, StoreError> {
        Err(down())
    }

    async fn find_by_id(&self, _: Uuid) -> Result<Option<Account>, StoreError> {
        Err(down())
    }

    async fn set_secret_payload(&self, _: Uuid, _: &str) -> Result<Account, StoreError> {
        Err(down())
    }

    async fn find_or_create_federated(
        &self,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> Result<Account, StoreError> {
        Err(down())
    }

    async fn attach_federated_id(&self, _: Uuid, _: &str, _: &str) -> Result<Account, StoreError> {
        Err(down())
    }

    async fn accounts_with_secret(&self) -> Result<Vec<CommunitySecret>, StoreError> {
        Err(down())
    }
}

#[tokio::test]
async fn store_outage_is_never_reported_as_a_failed_login() -> Result<()> {
    let core = AuthCore::new(&test_config(), UnavailableStore)?;

    let login = core.login_local("a@x.com", "hunter2").await;
    assert!(matches!(login, Err(AuthError::StoreUnavailable(_))));

    let register = core.register_local("a@x.com", "hunter2").await;
    assert!(matches!(register, Err(AuthError::StoreUnavailable(_))));

    let federated = core.login_federated("google", "g123", None).await;
    assert!(matches!(federated, Err(AuthError::StoreUnavailable(_))));

    Ok(())
}
