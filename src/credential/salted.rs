//! Salted adaptive hashing (bcrypt).
//!
//! The only policy recommended for production. Each `encode` draws a fresh
//! random salt; the salt and cost travel inside the stored form, so `verify`
//! needs nothing beyond the plaintext and the record.

use anyhow::{Context, Result};

pub(super) fn encode(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost).context("failed to hash credential")
}

pub(super) fn verify(plaintext: &str, stored: &str) -> bool {
    // Unparseable stored forms are a mismatch, not an error.
    bcrypt::verify(plaintext, stored).unwrap_or(false)
}
