// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the mining dashboard
///
/// Every core operation recovers locally (see [`TransferError`] and
/// [`DecryptError`]); this enum covers the ambient failures that surface
/// through the CLI: configuration, I/O, export and thread coordination.
///
/// [`TransferError`]: crate::ledger::TransferError
/// [`DecryptError`]: crate::cipher::DecryptError
#[derive(Error, Debug)]
pub enum MinerError {
    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors while exporting snapshots
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A mutex guarding shared mining state was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    LockError(String),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Background worker failed to run or join
    #[error("Task execution error: {0}")]
    TaskError(String),
}

/// Converts crossbeam channel send errors for stop signals into MinerError
///
/// Used when the scheduler fails to wake the worker out of its
/// inter-batch pause.
impl From<crossbeam_channel::TrySendError<()>> for MinerError {
    fn from(e: crossbeam_channel::TrySendError<()>) -> Self {
        MinerError::ChannelError(format!("Stop signal send failed: {}", e))
    }
}

/// Converts hex decoding errors into MinerError
///
/// Used by the CLI when a user-supplied ciphertext is not valid hex.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for MinerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MinerError::LockError(e.to_string())
    }
}
