// src/miner/worker.rs
//! Parallel attempt throughput measurement
//!
//! Each rayon task owns an independent miner (and, for RedCode, a private
//! ledger) built from the same profile, so tasks never contend on a lock.

use crate::ledger::Ledger;
use crate::miner::coins::{BitcoinMiner, Miner, MoneroMiner, RedCodeMiner};
use crate::miner::base::MinerProfile;
use crate::scoring::ScoringEngine;
use crate::types::CoinKind;
use crate::utils::error::MinerError;
use rayon::prelude::*;
use serde::Serialize;
use std::time::{Duration, Instant};

const BENCH_ADDRESS: &str = "RDC_BENCH";

/// Attempts made between clock checks in timed runs
const CHUNK: u64 = 256;

/// Result of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerReport {
    /// Coin benchmarked
    pub coin: CoinKind,
    /// Difficulty used
    pub difficulty: u32,
    /// Threads used
    pub threads: usize,
    /// Attempts made
    pub attempts: u64,
    /// Attempts that met the difficulty
    pub shares: u64,
    /// Wall-clock time taken
    pub elapsed: Duration,
}

impl WorkerReport {
    /// Raw attempts per second
    pub fn attempts_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// One benchmark miner and whatever it mines into
enum BenchMiner {
    Plain(Box<dyn Miner>),
    Scored(RedCodeMiner, Ledger),
}

impl BenchMiner {
    fn step(&mut self, difficulty: u32) -> bool {
        match self {
            BenchMiner::Plain(miner) => miner.attempt(difficulty).success,
            BenchMiner::Scored(miner, ledger) => miner.mine_with_scoring(ledger, difficulty).success,
        }
    }
}

/// Runs attempts for one coin across a dedicated rayon pool
pub struct Worker {
    coin: CoinKind,
    profile: MinerProfile,
    difficulty: u32,
    threads: usize,
}

impl Worker {
    /// Creates a Worker
    ///
    /// # Arguments
    /// * `coin` - Coin profile to benchmark
    /// * `difficulty` - Leading hex zeros per attempt
    /// * `threads` - Pool size (at least 1)
    pub fn new(coin: CoinKind, difficulty: u32, threads: usize) -> Self {
        Worker {
            coin,
            profile: MinerProfile::builtin(coin),
            difficulty,
            threads: threads.max(1),
        }
    }

    fn spawn_miner(&self) -> BenchMiner {
        let engine = ScoringEngine::new().into_shared();
        let profile = self.profile.clone();
        match self.coin {
            CoinKind::Bitcoin => BenchMiner::Plain(Box::new(BitcoinMiner::new(engine, profile))),
            CoinKind::Monero => BenchMiner::Plain(Box::new(MoneroMiner::new(engine, profile))),
            CoinKind::RedCode => {
                let mut ledger = Ledger::new();
                let miner = RedCodeMiner::new(engine, profile, &mut ledger, BENCH_ADDRESS);
                BenchMiner::Scored(miner, ledger)
            }
        }
    }

    fn pool(&self) -> Result<rayon::ThreadPool, MinerError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("bench-{}", i))
            .build()
            .map_err(|e| MinerError::TaskError(format!("Failed to build thread pool: {}", e)))
    }

    fn report(&self, attempts: u64, shares: u64, elapsed: Duration) -> WorkerReport {
        WorkerReport {
            coin: self.coin,
            difficulty: self.difficulty,
            threads: self.threads,
            attempts,
            shares,
            elapsed,
        }
    }

    /// Makes exactly `attempts` attempts.
    pub fn run_attempts(&self, attempts: u64) -> Result<WorkerReport, MinerError> {
        let pool = self.pool()?;
        let start = Instant::now();
        let shares = pool.install(|| {
            (0..attempts)
                .into_par_iter()
                .map_init(|| self.spawn_miner(), |miner, _| u64::from(miner.step(self.difficulty)))
                .sum::<u64>()
        });
        Ok(self.report(attempts, shares, start.elapsed()))
    }

    /// Attempts on every thread until `duration` has passed.
    pub fn run_for(&self, duration: Duration) -> Result<WorkerReport, MinerError> {
        log::info!(
            "Benchmarking {} for {:?} on {} threads (difficulty {})",
            self.coin.miner_name(),
            duration,
            self.threads,
            self.difficulty
        );
        let pool = self.pool()?;
        let start = Instant::now();
        let (attempts, shares) = pool.install(|| {
            (0..self.threads)
                .into_par_iter()
                .map(|_| {
                    let mut miner = self.spawn_miner();
                    let (mut attempts, mut shares) = (0u64, 0u64);
                    loop {
                        for _ in 0..CHUNK {
                            shares += u64::from(miner.step(self.difficulty));
                        }
                        attempts += CHUNK;
                        if start.elapsed() >= duration {
                            break;
                        }
                    }
                    (attempts, shares)
                })
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
        });
        Ok(self.report(attempts, shares, start.elapsed()))
    }
}
