//! Error taxonomy for the authentication core.
//!
//! Every failure a caller can act on is a typed variant; nothing here is a
//! panic. `InvalidCredentials` deliberately collapses "no such identifier"
//! and "wrong secret" into a single value so callers cannot enumerate
//! accounts by comparing error responses.

use thiserror::Error;

/// Failures surfaced by the [`crate::core::AuthCore`] operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with the requested identifier already exists.
    #[error("account already exists")]
    DuplicateAccount,

    /// Authentication failed. Unknown identifier and wrong secret produce
    /// this same value; do not split them apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A federated assertion was missing required fields or named an
    /// unknown provider.
    #[error("invalid federated assertion")]
    InvalidAssertion,

    /// The referenced account does not exist.
    #[error("account not found")]
    NotFound,

    /// The persistence backend could not be reached. Callers must treat
    /// this differently from a failed login; it is never masked as one.
    #[error("account store unavailable: {0}")]
    StoreUnavailable(String),

    /// Ambient fault (rng, cipher setup) that is not a caller mistake.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

/// Failures surfaced by [`crate::account::AccountStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on `identifier` or a federated link.
    #[error("duplicate record")]
    Duplicate,

    /// No account with the given id.
    #[error("record not found")]
    NotFound,

    /// Transport-level failure reaching the backend.
    #[error("store unreachable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::DuplicateAccount,
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}
