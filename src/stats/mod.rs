//! Statistics collection and reporting module
//!
//! This module provides functionality for reporting mining statistics,
//! including:
//! - Aggregated hashes, shares and rates from published snapshots
//! - RedCode mining balance
//! - Hardware monitoring (CPU, memory, temperature)
//!
//! The main component is [`StatsReporter`] which reads the latest
//! dashboard snapshot and periodically reports it to the logs.
//!

/// Submodule containing the statistics reporter implementation
///
/// The reporter handles:
/// - Lock-free reads of the published snapshot
/// - Hardware monitoring
/// - Periodic reporting of stats until stopped
pub mod reporter;

// Re-export main components
pub use reporter::{HardwareStats, MiningStats, StatsReporter};
