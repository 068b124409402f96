//! # Confidant (Credential Verification & Session Identity Core)
//!
//! `confidant` is the authentication core of the secrets community
//! application: it decides whether an `(identifier, secret)` pair or a
//! federated provider assertion authenticates, and it owns the session
//! lifecycle that proves that identity on later requests.
//!
//! ## Credential policies
//!
//! The stored form of a credential is produced by a configurable
//! [`credential::CredentialCodec`]:
//!
//! - **Salted adaptive** (default): bcrypt with a per-call random salt and a
//!   configurable work factor. The only policy fit for production.
//! - **Unsalted digest** and **reversible encryption**: retained for records
//!   written by the earlier variants of the application; both carry
//!   `Insecure` in their configuration names for a reason.
//!
//! ## Sessions
//!
//! Successful authentication ends in [`session::SessionManager`] issuing an
//! opaque 256-bit reference with sliding expiry. Only the reference's hash is
//! kept server-side. Unknown, expired, and tampered references are
//! indistinguishable to callers.
//!
//! ## Federated identity
//!
//! [`federated::FederatedReconciler`] maps an already-validated provider
//! assertion to a local account with atomic find-or-create semantics. No
//! plaintext secret is ever involved, and accounts from different providers
//! are never merged unless the caller links them explicitly.
//!
//! Rendering, routing, and the OAuth handshake itself live outside this
//! crate; persistence is injected through [`account::AccountStore`].

pub mod account;
pub mod config;
pub mod core;
pub mod credential;
pub mod error;
pub mod federated;
pub mod local;
pub mod session;

pub use account::{Account, AccountStore, CommunitySecret, MemoryAccountStore};
pub use config::{CoreConfig, CredentialPolicy, ProviderCredentials};
pub use self::core::{AuthCore, SessionHandle};
pub use credential::CredentialCodec;
pub use error::{AuthError, StoreError};
pub use federated::FederatedAssertion;
pub use session::SessionManager;
