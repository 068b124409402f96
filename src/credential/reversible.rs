//! Reversible symmetric encryption (ChaCha20-Poly1305).
//!
//! Stored form is `enc$base64(nonce || ciphertext)`. The key is process-wide
//! and never derived from request data. Operational risk, not a bug: losing
//! the key invalidates every stored credential at once.

use anyhow::{Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

const PREFIX: &str = "enc$";
const NONCE_LEN: usize = 12;

pub(super) struct ReversibleCipher {
    cipher: ChaCha20Poly1305,
}

impl ReversibleCipher {
    pub(super) fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    pub(super) fn encode(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|err| anyhow!("encryption failure: {err}"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(format!("{PREFIX}{}", URL_SAFE_NO_PAD.encode(blob)))
    }

    pub(super) fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Some(decrypted) = self.decrypt(stored) else {
            return false;
        };
        decrypted.as_slice().ct_eq(plaintext.as_bytes()).into()
    }

    fn decrypt(&self, stored: &str) -> Option<Vec<u8>> {
        let encoded = stored.strip_prefix(PREFIX)?;
        let blob = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        if blob.len() < NONCE_LEN {
            return None;
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .ok()
    }
}
