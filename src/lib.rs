//! RedCode Miner - simulated multi-coin mining dashboard in Rust
//!
//! This crate provides a simulated miner for Bitcoin, Monero and the
//! local RedCode token with support for:
//! - A four-slot scoring engine salting every share digest
//! - An in-memory RedCode ledger credited by scored mining
//! - A session-keyed XOR cipher channel for agent messages
//! - A background worker publishing lock-free dashboard snapshots
//! - Performance benchmarking and hardware monitoring

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Scoring engine shared by the miners
pub mod scoring;

/// RedCode token ledger
pub mod ledger;

/// Agent message cipher channel
pub mod cipher;

/// Miner core, coin variants, orchestrator and scheduling
pub mod miner;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cipher::{CipherChannel, DecryptError};
pub use cli::Commands;
pub use config::Config;
pub use ledger::{Ledger, TransferError};
pub use miner::{
    CycleReport, DashboardSnapshot, Miner, MiningOrchestrator, Scheduler, WalletReport, Worker,
};
pub use scoring::{ScoringEngine, SharedEngine};
pub use stats::{HardwareStats, MiningStats, StatsReporter};
pub use types::CoinKind;
pub use utils::{MinerError, init_logging};
