// src/cipher/mod.rs
//! Message tagging layer
//!
//! A symmetric XOR stream cipher with a per-channel session key and a relay
//! log. See [`channel`] for the known non-ASCII limitation.

/// Cipher channel implementation
pub mod channel;

pub use channel::{CipherChannel, CommRecord, DecryptError};
