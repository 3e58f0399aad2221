// src/stats/reporter.rs
use crate::miner::orchestrator::DashboardSnapshot;
use crate::miner::scheduler::SnapshotSlot;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use sysinfo::{Components, System};

/// Aggregated mining figures from one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiningStats {
    /// Attempts across all miners
    pub hashes_total: u64,
    /// Accepted shares across all miners
    pub shares_found: u64,
    /// Sum of the throttled display rates (H/s)
    pub combined_hashrate: f64,
    /// RDC held by the mining address
    pub miner_balance: f64,
    /// USD value of every hash computed so far
    pub value_generated: f64,
}

impl MiningStats {
    /// Folds the per-miner rows of a snapshot
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        snapshot.miners.values().fold(
            MiningStats {
                miner_balance: snapshot.ledger.miner_balance,
                ..MiningStats::default()
            },
            |mut stats, miner| {
                stats.hashes_total += miner.total_hashes;
                stats.shares_found += miner.shares_found;
                stats.combined_hashrate += miner.hash_rate;
                stats.value_generated += miner.value.total_value_generated;
                stats
            },
        )
    }
}

/// Statistics related to hardware performance
#[derive(Debug, Clone)]
pub struct HardwareStats {
    /// Current CPU usage percentage (0-100)
    pub cpu_usage: f32,
    /// Memory currently used by the system (in bytes)
    pub memory_used: u64,
    /// Current CPU temperature in Celsius
    pub temperature: f32,
}

/// Periodically logs the published dashboard snapshot with hardware figures
pub struct StatsReporter {
    /// Snapshot slot written by the scheduler
    source: SnapshotSlot,
    /// System information collector
    system: System,
    /// Hardware component information collector
    components: Components,
    /// Interval at which stats are reported
    report_interval: Duration,
    /// Stop signal for the reporting thread
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl Clone for StatsReporter {
    fn clone(&self) -> Self {
        StatsReporter {
            source: self.source.clone(),
            system: System::new_all(),
            components: Components::new_with_refreshed_list(),
            report_interval: self.report_interval,
            stop_tx: self.stop_tx.clone(),
            stop_rx: self.stop_rx.clone(),
        }
    }
}

impl StatsReporter {
    /// Creates a new StatsReporter with the specified reporting interval
    ///
    /// # Arguments
    /// * `source` - Slot the scheduler publishes snapshots into
    /// * `report_interval` - How often to log statistics
    pub fn new(source: SnapshotSlot, report_interval: Duration) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        StatsReporter {
            source,
            system: System::new_all(),
            components: Components::new_with_refreshed_list(),
            report_interval,
            stop_tx,
            stop_rx,
        }
    }

    /// Latest published snapshot
    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        self.source.load_full()
    }

    /// Gets the current mining statistics
    pub fn get_stats(&self) -> MiningStats {
        MiningStats::from_snapshot(&self.latest())
    }

    /// Gets the current hardware statistics
    ///
    /// This refreshes system information before returning the stats.
    pub fn get_hardware_stats(&mut self) -> HardwareStats {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.components.refresh(true);

        let cpus = self.system.cpus();
        let cpu_usage = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
        };

        let temperature = self
            .components
            .iter()
            .find(|c| c.label().contains("CPU"))
            .and_then(|c| c.temperature())
            .unwrap_or(0.0);

        HardwareStats {
            cpu_usage,
            memory_used: self.system.used_memory(),
            temperature,
        }
    }

    /// Starts the periodic reporting of statistics
    ///
    /// This spawns a background thread that logs stats at the configured
    /// interval until [`stop`](Self::stop) is called.
    pub fn start_reporting(&self) -> JoinHandle<()> {
        let mut reporter = self.clone();

        std::thread::spawn(move || {
            loop {
                match reporter.stop_rx.recv_timeout(reporter.report_interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let snapshot = reporter.latest();
                let mining_stats = MiningStats::from_snapshot(&snapshot);
                let hw_stats = reporter.get_hardware_stats();

                log::info!(
                    "{} | Rate: {:.2} H/s | Shares: {} / {} hashes | Balance: {:.4} {} | CPU: {:.1}% | Mem: {} MiB | Temp: {:.1}°C",
                    if snapshot.running { "MINING" } else { "IDLE" },
                    mining_stats.combined_hashrate,
                    mining_stats.shares_found,
                    mining_stats.hashes_total,
                    mining_stats.miner_balance,
                    snapshot.ledger.symbol,
                    hw_stats.cpu_usage,
                    hw_stats.memory_used / (1024 * 1024),
                    hw_stats.temperature
                );
            }
        })
    }

    /// Signals the reporting thread to exit.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::miner::MiningOrchestrator;
    use arc_swap::ArcSwap;

    fn slot_with_cycles(iterations: u64) -> SnapshotSlot {
        let mut config = Config::default();
        config.mining.rng_seed = Some(5);
        config.miners.redcode.difficulty = Some(0);
        let mut orchestrator = MiningOrchestrator::new(&config);
        orchestrator.run_cycle(iterations);
        Arc::new(ArcSwap::from_pointee(orchestrator.snapshot()))
    }

    #[test]
    fn test_stats_fold_every_miner() {
        let reporter = StatsReporter::new(slot_with_cycles(4), Duration::from_secs(1));
        let stats = reporter.get_stats();
        assert_eq!(stats.hashes_total, 12);
        assert!(stats.shares_found >= 4);
        assert!(stats.miner_balance > 0.0);
        assert!(stats.combined_hashrate > 0.0);
    }

    #[test]
    fn test_reporter_sees_new_publications() {
        let slot = slot_with_cycles(0);
        let reporter = StatsReporter::new(slot.clone(), Duration::from_secs(1));
        assert_eq!(reporter.get_stats().hashes_total, 0);

        slot.store(slot_with_cycles(2).load_full());
        assert_eq!(reporter.get_stats().hashes_total, 6);
    }

    #[test]
    fn test_reporting_thread_stops() {
        let reporter = StatsReporter::new(slot_with_cycles(1), Duration::from_millis(5));
        let handle = reporter.start_reporting();
        std::thread::sleep(Duration::from_millis(20));
        reporter.stop();
        handle.join().unwrap();
    }

    #[test]
    fn test_hardware_stats_are_sane() {
        let mut reporter = StatsReporter::new(slot_with_cycles(0), Duration::from_secs(1));
        let hw = reporter.get_hardware_stats();
        assert!(hw.cpu_usage >= 0.0);
    }
}
