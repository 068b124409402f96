//! Unsalted one-way digest (SHA-256).
//!
//! Weakest policy: identical plaintexts produce identical stored forms, so
//! records can be correlated and attacked with precomputed tables. Kept only
//! for records written by the earlier digest variant of the application.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const PREFIX: &str = "sha256$";

pub(super) fn encode(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    format!("{PREFIX}{}", URL_SAFE_NO_PAD.encode(digest))
}

pub(super) fn verify(plaintext: &str, stored: &str) -> bool {
    let Some(encoded) = stored.strip_prefix(PREFIX) else {
        return false;
    };
    let Ok(stored_digest) = URL_SAFE_NO_PAD.decode(encoded) else {
        return false;
    };
    let digest = Sha256::digest(plaintext.as_bytes());
    digest.as_slice().ct_eq(&stored_digest).into()
}
