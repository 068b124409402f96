//! Credential Codec: turns a plaintext secret into a storable form and
//! verifies later inputs against it.
//!
//! The codec is pure, no I/O, apart from salt/nonce randomness and, for the
//! reversible policy, the process-wide key. `verify` fails closed: a
//! malformed stored form is a mismatch, never an error, so one corrupted
//! record cannot take the service down.

mod digest;
mod reversible;
mod salted;

use anyhow::{Context, Result, bail};
use secrecy::ExposeSecret;

use crate::config::{CoreConfig, CredentialPolicy};
use reversible::ReversibleCipher;

/// Process-wide credential codec, built once from [`CoreConfig`].
pub struct CredentialCodec {
    policy: Policy,
}

enum Policy {
    SaltedAdaptive { cost: u32 },
    Digest,
    Reversible(ReversibleCipher),
}

impl CredentialCodec {
    /// Build the codec for the configured policy.
    ///
    /// # Errors
    /// Fails when the adaptive cost is outside bcrypt's 4..=31 range, or when
    /// the reversible policy is selected without a key. Both are startup
    /// mistakes; nothing here fails per-request.
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        let policy = match config.credential_policy() {
            CredentialPolicy::SaltedAdaptive => {
                let cost = config.adaptive_cost();
                if !(4..=31).contains(&cost) {
                    bail!("adaptive cost {cost} outside the valid 4..=31 range");
                }
                Policy::SaltedAdaptive { cost }
            }
            CredentialPolicy::DigestInsecure => Policy::Digest,
            CredentialPolicy::ReversibleInsecure => {
                let key = config
                    .reversible_key()
                    .context("reversible policy selected but no key configured")?;
                Policy::Reversible(ReversibleCipher::new(key.expose_secret()))
            }
        };
        Ok(Self { policy })
    }

    /// Encode a plaintext secret into its stored form.
    ///
    /// # Errors
    /// Only on rng or cipher faults; never because of the plaintext itself.
    pub fn encode(&self, plaintext: &str) -> Result<String> {
        match &self.policy {
            Policy::SaltedAdaptive { cost } => salted::encode(plaintext, *cost),
            Policy::Digest => Ok(digest::encode(plaintext)),
            Policy::Reversible(cipher) => cipher.encode(plaintext),
        }
    }

    /// Check a plaintext secret against a stored form. Fails closed.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match &self.policy {
            Policy::SaltedAdaptive { .. } => salted::verify(plaintext, stored),
            Policy::Digest => digest::verify(plaintext, stored),
            Policy::Reversible(cipher) => cipher.verify(plaintext, stored),
        }
    }
}
