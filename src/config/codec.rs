//! Obfuscation of sensitive text entries at rest.
//!
//! Only values of entries declared with [`ConfigStore::add_encrypted_text`]
//! pass through here, and only when written to or read from a settings file.
//!
//! Scheme: a stream key and a MAC key are derived from the secret with
//! SHA-256 under separate labels. The plaintext is XORed with an
//! HMAC-SHA256 counter-mode keystream, a truncated HMAC-SHA256 tag over the
//! ciphertext is prepended, and the whole thing is Base64 encoded. There is
//! no nonce, so encoding is deterministic for a given secret.
//!
//! [`ConfigStore::add_encrypted_text`]: super::ConfigStore::add_encrypted_text

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the HMAC tag kept in the stored value.
const TAG_LEN: usize = 16;

/// Secret used when a store is not given one explicitly.
const DEFAULT_SECRET: &[u8] = b"scraper-config:provider-settings:v1";

/// Reversible encoder for persisted secret values.
#[derive(Clone)]
pub struct EntryCodec {
    stream_key: Key<HmacSha256>,
    mac_key: Key<HmacSha256>,
}

impl EntryCodec {
    /// Build a codec keyed from `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            stream_key: derive_key(b"stream", secret),
            mac_key: derive_key(b"mac", secret),
        }
    }

    /// Obfuscate `plain` for storage.
    pub fn encode(&self, plain: &str) -> String {
        let mut body = plain.as_bytes().to_vec();
        self.apply_keystream(&mut body);

        let mut mac = keyed_mac(&self.mac_key);
        mac.update(&body);
        let tag = mac.finalize().into_bytes();

        let mut out = Vec::with_capacity(TAG_LEN + body.len());
        out.extend_from_slice(&tag[..TAG_LEN]);
        out.extend_from_slice(&body);
        STANDARD.encode(out)
    }

    /// Recover the plaintext from a stored value.
    ///
    /// Fails on malformed Base64, truncated input, a tag mismatch, or a
    /// plaintext that is not UTF-8.
    pub fn decode(&self, stored: &str) -> Result<String> {
        let raw = STANDARD
            .decode(stored.trim())
            .map_err(|e| Error::decode(format!("invalid base64: {e}")))?;
        if raw.len() < TAG_LEN {
            return Err(Error::decode("stored value is too short"));
        }

        let (tag, body) = raw.split_at(TAG_LEN);
        let mut mac = keyed_mac(&self.mac_key);
        mac.update(body);
        mac.verify_truncated_left(tag)
            .map_err(|_| Error::decode("integrity check failed"))?;

        let mut plain = body.to_vec();
        self.apply_keystream(&mut plain);
        String::from_utf8(plain).map_err(|_| Error::decode("plaintext is not valid UTF-8"))
    }

    fn apply_keystream(&self, data: &mut [u8]) {
        for (counter, chunk) in data.chunks_mut(32).enumerate() {
            let mut mac = keyed_mac(&self.stream_key);
            mac.update(&(counter as u64).to_be_bytes());
            let block = mac.finalize().into_bytes();
            for (byte, key) in chunk.iter_mut().zip(block.iter()) {
                *byte ^= key;
            }
        }
    }
}

impl Default for EntryCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET)
    }
}

impl fmt::Debug for EntryCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryCodec").finish_non_exhaustive()
    }
}

/// A 256-bit SHA-256 digest, zero-padded to the HMAC block size.
fn derive_key(label: &[u8], secret: &[u8]) -> Key<HmacSha256> {
    let digest = Sha256::new()
        .chain_update(label)
        .chain_update(secret)
        .finalize();
    let mut key = Key::<HmacSha256>::default();
    key[..digest.len()].copy_from_slice(&digest);
    key
}

fn keyed_mac(key: &Key<HmacSha256>) -> HmacSha256 {
    <HmacSha256 as KeyInit>::new(key)
}
