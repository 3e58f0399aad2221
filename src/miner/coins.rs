// src/miner/coins.rs
//! Coin-specific miners
//!
//! All three variants share [`MinerCore`]; they differ only in display
//! metadata, Monero's wallet connection record and RedCode's scored mining
//! with ledger rewards.

use crate::ledger::Ledger;
use crate::miner::base::{Attempt, MinerCore, MinerProfile};
use crate::miner::value::HashValue;
use crate::scoring::SharedEngine;
use crate::types::CoinKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Common miner interface
pub trait Miner: Send {
    /// Shared state
    fn core(&self) -> &MinerCore;

    /// Shared state, mutably
    fn core_mut(&mut self) -> &mut MinerCore;

    /// One mining attempt at `difficulty` leading hex zeros
    fn attempt(&mut self, difficulty: u32) -> Attempt {
        self.core_mut().attempt(difficulty)
    }

    /// Recomputes and returns the throttled display rate
    fn reported_rate(&mut self, elapsed_secs: f64) -> f64 {
        self.core_mut().reported_rate(elapsed_secs)
    }

    /// Value-per-hash estimate at the current display rate
    fn value_per_hash(&self) -> HashValue {
        self.core().value_per_hash()
    }

    /// Which coin this miner simulates
    fn kind(&self) -> CoinKind {
        self.core().coin()
    }
}

/// Bitcoin (SHA-256) miner
#[derive(Debug)]
pub struct BitcoinMiner {
    core: MinerCore,
}

impl BitcoinMiner {
    /// Creates a Bitcoin miner on the shared engine
    pub fn new(engine: SharedEngine, profile: MinerProfile) -> Self {
        BitcoinMiner {
            core: MinerCore::new(CoinKind::Bitcoin, engine, profile),
        }
    }
}

impl Miner for BitcoinMiner {
    fn core(&self) -> &MinerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MinerCore {
        &mut self.core
    }
}

/// Default Monero node host
pub const DEFAULT_WALLET_HOST: &str = "127.0.0.1";
/// Default Monero wallet RPC port
pub const DEFAULT_WALLET_PORT: u16 = 18081;

/// Recorded Monero wallet endpoint. No connection is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletConnection {
    /// Node host
    pub host: String,
    /// Node port
    pub port: u16,
    /// When the endpoint was recorded
    pub connected_at: DateTime<Utc>,
}

/// Monero (RandomX) miner
#[derive(Debug)]
pub struct MoneroMiner {
    core: MinerCore,
    wallet: Option<WalletConnection>,
}

impl MoneroMiner {
    /// Creates a Monero miner on the shared engine
    pub fn new(engine: SharedEngine, profile: MinerProfile) -> Self {
        MoneroMiner {
            core: MinerCore::new(CoinKind::Monero, engine, profile),
            wallet: None,
        }
    }

    /// Records the wallet endpoint and reports success.
    pub fn connect_wallet(&mut self, host: &str, port: u16) -> bool {
        log::info!("Monero wallet endpoint set to {}:{}", host, port);
        self.wallet = Some(WalletConnection {
            host: host.to_string(),
            port,
            connected_at: Utc::now(),
        });
        true
    }

    /// Last recorded wallet endpoint
    pub fn wallet(&self) -> Option<&WalletConnection> {
        self.wallet.as_ref()
    }
}

impl Miner for MoneroMiner {
    fn core(&self) -> &MinerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MinerCore {
        &mut self.core
    }
}

/// Base RDC paid per accepted RedCode share
pub const BASE_REWARD: f64 = 50.0;

const SCORE10_ITERATIONS: usize = 50;
const SCORE100_DEPTH: u32 = 3;
const SCORE1000_FLOW_RATE: f64 = 1.5;

/// Outcome of one scored RedCode attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAttempt {
    /// Whether the digest met the difficulty
    pub success: bool,
    /// Lowercase hex digest
    pub digest: String,
    /// RDC minted to the mining address, `0.0` on failure
    pub reward: f64,
    /// Weighted scoring multiplier used for this attempt
    pub multiplier: f64,
}

/// RedCode (QuantumProof) miner, paid out on the local ledger
#[derive(Debug)]
pub struct RedCodeMiner {
    core: MinerCore,
    mining_address: String,
}

impl RedCodeMiner {
    /// Creates the miner and registers its reward wallet with a zero balance.
    pub fn new(
        engine: SharedEngine,
        profile: MinerProfile,
        ledger: &mut Ledger,
        mining_address: impl Into<String>,
    ) -> Self {
        let mining_address = mining_address.into();
        ledger.create_wallet(&mining_address, 0.0);
        RedCodeMiner {
            core: MinerCore::new(CoinKind::RedCode, engine, profile),
            mining_address,
        }
    }

    /// Address credited with rewards
    pub fn mining_address(&self) -> &str {
        &self.mining_address
    }

    /// Runs all four scorings, then one attempt. A successful attempt mints
    /// `BASE_REWARD + multiplier * 0.1` to the mining address.
    pub fn mine_with_scoring(&mut self, ledger: &mut Ledger, difficulty: u32) -> ScoredAttempt {
        let multiplier = {
            let mut engine = self.core.engine();
            let sample = engine.draw_uniform(5);
            let s5 = engine.score5(&sample);
            let s10 = engine.score10(SCORE10_ITERATIONS);
            let s100 = engine.score100(SCORE100_DEPTH);
            let s1000 = engine.score1000(SCORE1000_FLOW_RATE);
            0.1 * s5 + 0.001 * s10 + 0.5 * s100 + 0.0001 * s1000
        };

        let Attempt { success, digest } = self.core.attempt(difficulty);
        let reward = if success {
            let reward = BASE_REWARD + multiplier * 0.1;
            ledger.mint(&self.mining_address, reward);
            log::debug!("Minted {:.8} RDC to {}", reward, self.mining_address);
            reward
        } else {
            0.0
        };

        ScoredAttempt {
            success,
            digest,
            reward,
            multiplier,
        }
    }
}

impl Miner for RedCodeMiner {
    fn core(&self) -> &MinerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MinerCore {
        &mut self.core
    }
}
