// src/cipher/channel.rs
//! Single-key XOR stream cipher for tagging agent-to-agent messages
//!
//! This is an obfuscation layer, not encryption in any security sense: the
//! key is the SHA-256 hex digest of the channel's creation time and is
//! reused for every message.
//!
//! Known defect, kept for wire compatibility: `encrypt` XORs Unicode code
//! points and then UTF-8 encodes the result, while `decrypt` XORs raw bytes.
//! Only ASCII messages round-trip. Non-ASCII input yields multi-byte output
//! whose decryption does not match the original.

use crate::utils::error::MinerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Why a ciphertext could not be decrypted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecryptError {
    /// The payload was not valid hex
    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// One relayed message as stored in the channel log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommRecord {
    /// Sending agent id
    pub from: String,
    /// Receiving agent id
    pub to: String,
    /// Hex ciphertext as returned by [`CipherChannel::encrypt`]
    pub encrypted_message: String,
    /// Wall-clock time of relay
    pub timestamp: DateTime<Utc>,
}

/// Session-keyed XOR channel with an append-only relay log
#[derive(Debug, Clone)]
pub struct CipherChannel {
    key: String,
    log: Vec<CommRecord>,
}

impl Default for CipherChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherChannel {
    /// Creates a channel keyed on the current wall-clock time.
    pub fn new() -> Self {
        let now = Utc::now();
        let stamp = format!(
            "{}.{:06}",
            now.timestamp(),
            now.timestamp_subsec_micros()
        );
        CipherChannel {
            key: session_key(&stamp),
            log: Vec::new(),
        }
    }

    /// Creates a channel with an explicit session key.
    ///
    /// The XOR walks the key byte by byte, so only ASCII keys (one byte per
    /// character) are accepted.
    ///
    /// # Errors
    /// `MinerError::InputError` if the key is empty or not ASCII.
    pub fn with_key(key: impl Into<String>) -> Result<Self, MinerError> {
        let key = key.into();
        if key.is_empty() {
            return Err(MinerError::InputError("cipher key must not be empty".into()));
        }
        if !key.is_ascii() {
            return Err(MinerError::InputError("cipher key must be ASCII".into()));
        }
        Ok(CipherChannel {
            key,
            log: Vec::new(),
        })
    }

    /// The session key (lowercase hex for generated keys).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// XORs each code point with the key and hex-encodes the UTF-8 result.
    pub fn encrypt(&self, message: &str) -> String {
        let key = self.key.as_bytes();
        let mixed: String = message
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let code = c as u32 ^ key[i % key.len()] as u32;
                // A key byte only flips the low 8 bits and the surrogate block
                // is 256-aligned, so a scalar value never lands in it.
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect();
        hex::encode(mixed.as_bytes())
    }

    /// Hex-decodes and XORs each byte with the key.
    ///
    /// # Errors
    /// [`DecryptError::InvalidHex`] for malformed input.
    pub fn decrypt(&self, encrypted: &str) -> Result<String, DecryptError> {
        let key = self.key.as_bytes();
        let bytes = hex::decode(encrypted)?;
        Ok(bytes
            .iter()
            .enumerate()
            .map(|(i, b)| char::from(b ^ key[i % key.len()]))
            .collect())
    }

    /// Legacy contract: any decode failure yields an empty string.
    pub fn decrypt_or_empty(&self, encrypted: &str) -> String {
        self.decrypt(encrypted).unwrap_or_else(|e| {
            log::debug!("decrypt failed: {}", e);
            String::new()
        })
    }

    /// Encrypts `message`, logs the relay and returns the ciphertext.
    pub fn relay(&mut self, from: &str, to: &str, message: &str) -> String {
        let encrypted = self.encrypt(message);
        self.log.push(CommRecord {
            from: from.to_string(),
            to: to.to_string(),
            encrypted_message: encrypted.clone(),
            timestamp: Utc::now(),
        });
        encrypted
    }

    /// Relayed messages, oldest first.
    pub fn log(&self) -> &[CommRecord] {
        &self.log
    }
}

/// SHA-256 hex digest of `seed`.
fn session_key(seed: &str) -> String {
    hex::encode(Sha256::digest(seed.as_bytes()))
}
