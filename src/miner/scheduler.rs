// src/miner/scheduler.rs
//! Background mining loop
//!
//! One worker thread runs `run_cycle(batch_size)` under the orchestrator
//! lock, publishes a [`DashboardSnapshot`] and waits out the inter-batch
//! pause on a stop channel. Readers load the published snapshot and never
//! touch the lock.

use crate::config::Config;
use crate::miner::orchestrator::{DashboardSnapshot, MiningOrchestrator};
use crate::types::CoinKind;
use crate::utils::error::MinerError;
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Shared slot holding the latest published snapshot
pub type SnapshotSlot = Arc<ArcSwap<DashboardSnapshot>>;

/// Drives the orchestrator from a worker thread
pub struct Scheduler {
    /// Mining state, locked by the worker for one batch at a time
    core: Arc<Mutex<MiningOrchestrator>>,
    /// Latest snapshot (atomically swappable)
    published: SnapshotSlot,
    /// Flag to control the worker thread
    active: Arc<AtomicBool>,
    /// Wakes the worker out of its pause
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Rounds per batch
    batch_size: u64,
    /// Pause between batches
    pause: Duration,
}

impl Scheduler {
    /// Creates a Scheduler and publishes the initial snapshot
    ///
    /// # Arguments
    /// * `orchestrator` - The mining state to drive
    /// * `batch_size` - Rounds per `run_cycle` call
    /// * `pause` - Wait between batches
    pub fn new(orchestrator: MiningOrchestrator, batch_size: u64, pause: Duration) -> Self {
        let published = Arc::new(ArcSwap::from_pointee(orchestrator.snapshot()));
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        Scheduler {
            core: Arc::new(Mutex::new(orchestrator)),
            published,
            active: Arc::new(AtomicBool::new(false)),
            stop_tx,
            stop_rx,
            worker: Mutex::new(None),
            batch_size,
            pause,
        }
    }

    /// Builds the orchestrator and loop settings from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MiningOrchestrator::new(config),
            config.mining.batch_size,
            Duration::from_millis(config.mining.pause_ms),
        )
    }

    /// Starts the worker thread. Does nothing if it is already running.
    pub fn start_mining(&self) -> Result<(), MinerError> {
        let mut worker = self.worker.lock()?;
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // a stop token left over from an earlier run would end this one at once
        while self.stop_rx.try_recv().is_ok() {}

        if let Err(e) = self.with_core(MiningOrchestrator::start) {
            self.active.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let core = self.core.clone();
        let published = self.published.clone();
        let active = self.active.clone();
        let stop_rx = self.stop_rx.clone();
        let batch = self.batch_size;
        let pause = self.pause;

        let spawned = std::thread::Builder::new()
            .name("mining-worker".into())
            .spawn(move || {
                log::debug!("Mining worker started (batch {}, pause {:?})", batch, pause);
                while active.load(Ordering::SeqCst) {
                    let snapshot = match core.lock() {
                        Ok(mut orchestrator) => {
                            orchestrator.run_cycle(batch);
                            orchestrator.snapshot()
                        }
                        Err(e) => {
                            log::error!("Mining state poisoned, worker exiting: {}", e);
                            active.store(false, Ordering::SeqCst);
                            break;
                        }
                    };
                    published.store(Arc::new(snapshot));

                    match stop_rx.recv_timeout(pause) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Mining worker exited");
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                self.with_core(MiningOrchestrator::stop)?;
                Err(e.into())
            }
        }
    }

    /// Stops the worker, waits for it to finish its batch and publishes the
    /// stopped state.
    pub fn stop(&self) -> Result<(), MinerError> {
        let mut worker = self.worker.lock()?;
        self.active.store(false, Ordering::SeqCst);

        if let Some(handle) = worker.take() {
            match self.stop_tx.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(e) => return Err(e.into()),
            }
            handle
                .join()
                .map_err(|_| MinerError::TaskError("mining worker panicked".into()))?;
        }

        self.with_core(MiningOrchestrator::stop)
    }

    /// Whether the worker is running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.published.load_full()
    }

    /// Slot the reporter reads from
    pub fn snapshot_slot(&self) -> SnapshotSlot {
        self.published.clone()
    }

    /// Applies a USD price between batches and republishes.
    pub fn set_price(&self, coin: CoinKind, usd_price: f64) -> Result<(), MinerError> {
        self.with_core(|orchestrator| orchestrator.set_price(coin, usd_price))
    }

    /// Runs `f` under the orchestrator lock, then republishes the snapshot.
    pub fn with_core<R>(
        &self,
        f: impl FnOnce(&mut MiningOrchestrator) -> R,
    ) -> Result<R, MinerError> {
        let mut orchestrator = self.core.lock()?;
        let result = f(&mut orchestrator);
        self.published.store(Arc::new(orchestrator.snapshot()));
        Ok(result)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Scheduler shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn scheduler(pause: Duration) -> Scheduler {
        let mut config = Config::default();
        config.mining.rng_seed = Some(3);
        config.mining.batch_size = 5;
        let orchestrator = MiningOrchestrator::new(&config);
        Scheduler::new(orchestrator, config.mining.batch_size, pause)
    }

    fn wait_for(scheduler: &Scheduler, predicate: impl Fn(&DashboardSnapshot) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if predicate(&scheduler.snapshot()) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_initial_snapshot_is_published() {
        let scheduler = scheduler(Duration::from_millis(10));
        let snapshot = scheduler.snapshot();
        assert!(!snapshot.running);
        assert_eq!(snapshot.miner(CoinKind::Bitcoin).unwrap().total_hashes, 0);
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_worker_publishes_batches() {
        let scheduler = scheduler(Duration::from_millis(1));
        scheduler.start_mining().unwrap();
        assert!(scheduler.is_active());
        assert!(wait_for(&scheduler, |s| {
            s.running && s.miner(CoinKind::RedCode).unwrap().total_hashes >= 10
        }));
        scheduler.stop().unwrap();

        let snapshot = scheduler.snapshot();
        assert!(!snapshot.running);
        assert!(!scheduler.is_active());
        let hashes = snapshot.miner(CoinKind::Bitcoin).unwrap().total_hashes;
        assert_eq!(hashes % 5, 0);
    }

    #[test]
    fn test_stop_interrupts_long_pause() {
        let scheduler = scheduler(Duration::from_secs(60));
        scheduler.start_mining().unwrap();
        assert!(wait_for(&scheduler, |s| {
            s.miner(CoinKind::Monero).unwrap().total_hashes >= 5
        }));

        let begun = Instant::now();
        scheduler.stop().unwrap();
        assert!(begun.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_restart_after_stop() {
        let scheduler = scheduler(Duration::from_millis(1));
        scheduler.start_mining().unwrap();
        scheduler.stop().unwrap();
        let before = scheduler.snapshot().miner(CoinKind::Bitcoin).unwrap().total_hashes;

        scheduler.start_mining().unwrap();
        assert!(wait_for(&scheduler, |s| {
            s.miner(CoinKind::Bitcoin).unwrap().total_hashes > before
        }));
        scheduler.stop().unwrap();
    }

    #[test]
    fn test_poisoned_state_leaves_scheduler_inactive() {
        let scheduler = scheduler(Duration::from_millis(1));
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = scheduler.with_core(|_| panic!("poison the orchestrator lock"));
        }));
        assert!(poisoned.is_err());

        assert!(matches!(
            scheduler.start_mining(),
            Err(MinerError::LockError(_))
        ));
        assert!(!scheduler.is_active());
        // a second attempt must fail again rather than report a phantom worker
        assert!(scheduler.start_mining().is_err());
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_set_price_republishes_immediately() {
        let scheduler = scheduler(Duration::from_millis(10));
        scheduler.set_price(CoinKind::Bitcoin, 90_000.0).unwrap();
        assert_eq!(
            scheduler.snapshot().miner(CoinKind::Bitcoin).unwrap().usd_price,
            90_000.0
        );
        let balance = scheduler.with_core(|o| o.balance(None)).unwrap();
        assert_eq!(balance, 0.0);
    }
}
