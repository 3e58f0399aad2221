// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the mining process:
//! - The shared miner core and its share acceptance rule
//! - Bitcoin, Monero and RedCode miner variants
//! - The orchestrator owning miners, ledger and cipher channel
//! - The background scheduler and the benchmark worker

/// Counters, digest and acceptance rule shared by every miner
pub mod base;

/// Coin-specific miners and the [`Miner`] trait
pub mod coins;

/// Value-per-hash estimates
pub mod value;

/// Top-level mining state and dashboard snapshots
pub mod orchestrator;

/// Background mining loop
///
/// Runs batches on a worker thread and publishes snapshots for readers.
pub mod scheduler;

/// Parallel benchmark worker
pub mod worker;

// Re-export main components for cleaner imports
pub use self::coins::{BitcoinMiner, Miner, MoneroMiner, RedCodeMiner, ScoredAttempt};
pub use self::base::{Attempt, MinerCore, MinerProfile, PoolInfo};
pub use self::orchestrator::{CycleReport, DashboardSnapshot, MiningOrchestrator, WalletReport};
pub use self::scheduler::{Scheduler, SnapshotSlot};
pub use self::value::{HashValue, parse_network_hashrate};
pub use self::worker::{Worker, WorkerReport};
