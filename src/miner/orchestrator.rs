// src/miner/orchestrator.rs
//! Top-level mining state
//!
//! Owns the ledger, the cipher channel, the shared scoring engine and the
//! three miners. Every mutation happens through `&mut self`; concurrent
//! access is arranged by the [`Scheduler`](crate::miner::Scheduler).

use crate::cipher::{CipherChannel, CommRecord, DecryptError};
use crate::config::Config;
use crate::ledger::{Ledger, TransferError};
use crate::miner::coins::{BitcoinMiner, Miner, MoneroMiner, RedCodeMiner, WalletConnection};
use crate::miner::base::MinerProfile;
use crate::miner::value::HashValue;
use crate::scoring::{ScoringEngine, ScoringState, SharedEngine};
use crate::types::CoinKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

/// Reward push reports kept for the dashboard; older ones are dropped.
pub const REWARD_PUSH_HISTORY: usize = 20;

/// Result reported by an external wallet collaborator, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletReport {
    /// Whether the collaborator succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Opaque collaborator payload
    #[serde(default)]
    pub detail: serde_json::Value,
    /// When the report was recorded
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl WalletReport {
    /// Report without a payload
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        WalletReport {
            success,
            message: message.into(),
            detail: serde_json::Value::Null,
            received_at: Utc::now(),
        }
    }

    /// Attaches an opaque payload
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Attempts and successes for one coin within a cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoinTally {
    /// Attempts made
    pub attempts: u64,
    /// Attempts that met the difficulty
    pub successes: u64,
}

impl CoinTally {
    fn record(&mut self, success: bool) {
        self.attempts += 1;
        if success {
            self.successes += 1;
        }
    }
}

/// Summary of one `run_cycle` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Rounds executed
    pub iterations: u64,
    /// Bitcoin tally
    pub bitcoin: CoinTally,
    /// Monero tally
    pub monero: CoinTally,
    /// RedCode tally
    pub redcode: CoinTally,
    /// RDC minted during the cycle
    pub redcode_rewards: f64,
}

impl CycleReport {
    /// Tally for one coin
    pub fn tally(&self, coin: CoinKind) -> CoinTally {
        match coin {
            CoinKind::Bitcoin => self.bitcoin,
            CoinKind::Monero => self.monero,
            CoinKind::RedCode => self.redcode,
        }
    }

    /// Successful attempts across all coins
    pub fn total_successes(&self) -> u64 {
        self.bitcoin.successes + self.monero.successes + self.redcode.successes
    }
}

/// Ledger figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    /// Token symbol
    pub symbol: String,
    /// Nominal supply
    pub total_supply: u64,
    /// Display decimals
    pub decimals: u8,
    /// Reward address
    pub mining_address: String,
    /// Balance of the reward address
    pub miner_balance: f64,
    /// RDC price in USD
    pub usd_price: f64,
    /// `miner_balance * usd_price`
    pub usd_value: f64,
    /// Sum of every wallet balance
    pub circulating: f64,
    /// Transfers recorded so far
    pub transactions: usize,
}

/// Per-miner dashboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinerSnapshot {
    /// Display name
    pub name: String,
    /// Algorithm label
    pub algorithm: String,
    /// Throttled display rate
    pub hash_rate: f64,
    /// Display-rate ceiling
    pub expected_hashrate: f64,
    /// Accepted shares
    pub shares_found: u64,
    /// Attempts
    pub total_hashes: u64,
    /// USD price
    pub usd_price: f64,
    /// Configured difficulty
    pub difficulty: u32,
    /// Dashboard mode flag
    pub simulated: bool,
    /// Pool name
    pub pool_name: String,
    /// Pool URL
    pub pool_url: String,
    /// Network hash rate text
    pub network_hashrate: String,
    /// Coins per block
    pub block_reward: f64,
    /// Value-per-hash figures
    pub value: HashValue,
    /// [`HashValue`] display string
    pub value_display: String,
    /// Monero wallet endpoint, when one was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletConnection>,
}

/// Immutable view of the whole mining state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Whether mining is started
    pub running: bool,
    /// Ledger figures
    pub ledger: LedgerSnapshot,
    /// Scoring engine slots
    pub scoring: ScoringState,
    /// One row per coin
    pub miners: BTreeMap<CoinKind, MinerSnapshot>,
    /// Feature toggles from configuration
    pub features: BTreeMap<String, bool>,
    /// Last wallet status report
    pub wallet_status: Option<WalletReport>,
    /// Most recent reward push reports, oldest first
    pub reward_pushes: Vec<WalletReport>,
    /// Reward pushes recorded since construction, including dropped ones
    pub reward_push_total: u64,
    /// Messages relayed through the cipher channel
    pub relayed_messages: usize,
}

impl DashboardSnapshot {
    /// Row for one coin
    pub fn miner(&self, coin: CoinKind) -> Option<&MinerSnapshot> {
        self.miners.get(&coin)
    }
}

/// Owns the miners, the ledger and the cipher channel
#[derive(Debug)]
pub struct MiningOrchestrator {
    engine: SharedEngine,
    ledger: Ledger,
    cipher: CipherChannel,
    bitcoin: BitcoinMiner,
    monero: MoneroMiner,
    redcode: RedCodeMiner,
    features: BTreeMap<String, bool>,
    running: bool,
    started_at: Option<Instant>,
    wallet_status: Option<WalletReport>,
    reward_pushes: VecDeque<WalletReport>,
    reward_push_total: u64,
}

impl MiningOrchestrator {
    /// Builds the orchestrator from configuration.
    ///
    /// The scoring engine is seeded from `mining.rng_seed` when present.
    pub fn new(config: &Config) -> Self {
        let engine = match config.mining.rng_seed {
            Some(seed) => ScoringEngine::seeded(seed),
            None => ScoringEngine::new(),
        };
        Self::with_engine(config, engine.into_shared())
    }

    /// Builds the orchestrator around an existing engine.
    pub fn with_engine(config: &Config, engine: SharedEngine) -> Self {
        let profile = |coin| MinerProfile::from_settings(coin, config.miner(coin));
        let mut ledger = Ledger::new();

        let bitcoin = BitcoinMiner::new(engine.clone(), profile(CoinKind::Bitcoin));
        let monero = MoneroMiner::new(engine.clone(), profile(CoinKind::Monero));
        let redcode = RedCodeMiner::new(
            engine.clone(),
            profile(CoinKind::RedCode),
            &mut ledger,
            config.ledger.mining_address.clone(),
        );

        MiningOrchestrator {
            engine,
            ledger,
            cipher: CipherChannel::new(),
            bitcoin,
            monero,
            redcode,
            features: config.features.clone(),
            running: false,
            started_at: None,
            wallet_status: None,
            reward_pushes: VecDeque::with_capacity(REWARD_PUSH_HISTORY),
            reward_push_total: 0,
        }
    }

    /// Marks mining as started and records the start instant.
    pub fn start(&mut self) {
        if !self.running {
            log::info!("Mining started");
        }
        self.running = true;
        self.started_at = Some(Instant::now());
    }

    /// Marks mining as stopped and clears the start instant.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Mining stopped");
        }
        self.running = false;
        self.started_at = None;
    }

    /// Whether mining is started
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds since `start()`, or `1.0` when not started.
    fn elapsed_secs(&self) -> f64 {
        self.started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(1.0)
    }

    /// Runs `iterations` rounds of one attempt per miner, then refreshes
    /// every display rate.
    pub fn run_cycle(&mut self, iterations: u64) -> CycleReport {
        let d_btc = self.bitcoin.core().profile().difficulty;
        let d_xmr = self.monero.core().profile().difficulty;
        let d_rdc = self.redcode.core().profile().difficulty;

        let mut report = CycleReport {
            iterations,
            ..CycleReport::default()
        };

        for _ in 0..iterations {
            report.bitcoin.record(self.bitcoin.attempt(d_btc).success);
            report.monero.record(self.monero.attempt(d_xmr).success);

            let scored = self.redcode.mine_with_scoring(&mut self.ledger, d_rdc);
            report.redcode.record(scored.success);
            report.redcode_rewards += scored.reward;
        }

        let elapsed = self.elapsed_secs();
        for miner in self.miners_mut() {
            miner.reported_rate(elapsed);
        }

        if report.total_successes() > 0 {
            log::debug!(
                "Cycle of {}: {} BTC / {} XMR / {} RDC shares, {:.8} RDC minted",
                iterations,
                report.bitcoin.successes,
                report.monero.successes,
                report.redcode.successes,
                report.redcode_rewards
            );
        }
        report
    }

    /// The miners in [`CoinKind::ALL`] order
    pub fn miners(&self) -> [&dyn Miner; 3] {
        [&self.bitcoin, &self.monero, &self.redcode]
    }

    fn miners_mut(&mut self) -> [&mut dyn Miner; 3] {
        [&mut self.bitcoin, &mut self.monero, &mut self.redcode]
    }

    /// Miner for one coin
    pub fn miner(&self, coin: CoinKind) -> &dyn Miner {
        match coin {
            CoinKind::Bitcoin => &self.bitcoin,
            CoinKind::Monero => &self.monero,
            CoinKind::RedCode => &self.redcode,
        }
    }

    fn miner_mut(&mut self, coin: CoinKind) -> &mut dyn Miner {
        match coin {
            CoinKind::Bitcoin => &mut self.bitcoin,
            CoinKind::Monero => &mut self.monero,
            CoinKind::RedCode => &mut self.redcode,
        }
    }

    /// Current display rate per coin
    pub fn mining_rates(&self) -> BTreeMap<CoinKind, f64> {
        self.miners()
            .into_iter()
            .map(|m| (m.kind(), m.core().hash_rate()))
            .collect()
    }

    /// Replaces one coin's USD price.
    pub fn set_price(&mut self, coin: CoinKind, usd_price: f64) {
        log::debug!("{} price set to {} USD", coin.symbol(), usd_price);
        self.miner_mut(coin).core_mut().set_usd_price(usd_price);
    }

    /// Balance of `address`, defaulting to the RedCode mining address.
    pub fn balance(&self, address: Option<&str>) -> f64 {
        self.ledger
            .balance(address.unwrap_or_else(|| self.redcode.mining_address()))
    }

    /// Moves RDC between wallets.
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> Result<(), TransferError> {
        self.ledger.transfer(from, to, amount)
    }

    /// The RedCode ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Current scoring slots
    pub fn scoring_state(&self) -> ScoringState {
        self.redcode.core().engine().state()
    }

    /// Handle to the shared scoring engine
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Encrypts and logs an agent-to-agent message.
    pub fn relay(&mut self, from: &str, to: &str, message: &str) -> String {
        self.cipher.relay(from, to, message)
    }

    /// Decrypts a payload produced by [`relay`](Self::relay).
    pub fn decrypt(&self, encrypted: &str) -> Result<String, DecryptError> {
        self.cipher.decrypt(encrypted)
    }

    /// Relayed messages
    pub fn relay_log(&self) -> &[CommRecord] {
        self.cipher.log()
    }

    /// Records the Monero wallet endpoint.
    pub fn connect_monero_wallet(&mut self, host: &str, port: u16) -> bool {
        self.monero.connect_wallet(host, port)
    }

    /// Stores the latest wallet status report.
    pub fn record_wallet_status(&mut self, report: WalletReport) {
        self.wallet_status = Some(report);
    }

    /// Appends a reward push report, keeping the last
    /// [`REWARD_PUSH_HISTORY`] of them.
    pub fn record_reward_push(&mut self, report: WalletReport) {
        if !report.success {
            log::warn!("Reward push failed: {}", report.message);
        }
        if self.reward_pushes.len() == REWARD_PUSH_HISTORY {
            self.reward_pushes.pop_front();
        }
        self.reward_pushes.push_back(report);
        self.reward_push_total += 1;
    }

    /// Copies the full state into an immutable snapshot.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let mining_address = self.redcode.mining_address().to_string();
        let miner_balance = self.ledger.balance(&mining_address);
        let rdc_price = self.redcode.core().usd_price();

        let miners = self
            .miners()
            .into_iter()
            .map(|miner| {
                let core = miner.core();
                let profile = core.profile();
                let value = miner.value_per_hash();
                let wallet = match miner.kind() {
                    CoinKind::Monero => self.monero.wallet().cloned(),
                    _ => None,
                };
                let row = MinerSnapshot {
                    name: miner.kind().miner_name().to_string(),
                    algorithm: miner.kind().algorithm().to_string(),
                    hash_rate: core.hash_rate(),
                    expected_hashrate: profile.expected_hashrate,
                    shares_found: core.shares_found(),
                    total_hashes: core.total_hashes(),
                    usd_price: core.usd_price(),
                    difficulty: profile.difficulty,
                    simulated: profile.simulated,
                    pool_name: profile.pool.pool_name.clone(),
                    pool_url: profile.pool.pool_url.clone(),
                    network_hashrate: profile.pool.network_hashrate.clone(),
                    block_reward: profile.pool.block_reward,
                    value_display: value.to_string(),
                    value,
                    wallet,
                };
                (miner.kind(), row)
            })
            .collect();

        DashboardSnapshot {
            taken_at: Utc::now(),
            running: self.running,
            ledger: LedgerSnapshot {
                symbol: self.ledger.symbol().to_string(),
                total_supply: self.ledger.total_supply(),
                decimals: self.ledger.decimals(),
                mining_address,
                miner_balance,
                usd_price: rdc_price,
                usd_value: miner_balance * rdc_price,
                circulating: self.ledger.circulating(),
                transactions: self.ledger.transactions().len(),
            },
            scoring: self.scoring_state(),
            miners,
            features: self.features.clone(),
            wallet_status: self.wallet_status.clone(),
            reward_pushes: self.reward_pushes.iter().cloned().collect(),
            reward_push_total: self.reward_push_total,
            relayed_messages: self.cipher.log().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> Config {
        let mut config = Config::default();
        config.mining.rng_seed = Some(11);
        config
    }

    #[test]
    fn test_new_orchestrator_is_idle() {
        let orchestrator = MiningOrchestrator::new(&seeded_config());
        assert!(!orchestrator.is_running());
        assert_eq!(orchestrator.balance(None), 0.0);
        assert_eq!(orchestrator.ledger().wallet_count(), 1);
        assert!(orchestrator.mining_rates().values().all(|r| *r == 0.0));
    }

    #[test]
    fn test_cycle_counts_attempts_per_coin() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        let report = orchestrator.run_cycle(25);
        for coin in CoinKind::ALL {
            assert_eq!(report.tally(coin).attempts, 25);
            assert_eq!(orchestrator.miner(coin).core().total_hashes(), 25);
            assert_eq!(
                orchestrator.miner(coin).core().shares_found(),
                report.tally(coin).successes
            );
        }
        assert_eq!(orchestrator.balance(None), report.redcode_rewards);
    }

    #[test]
    fn test_zero_difficulty_pays_every_round() {
        let mut config = seeded_config();
        config.miners.redcode.difficulty = Some(0);
        config.miners.bitcoin.difficulty = Some(0);
        let mut orchestrator = MiningOrchestrator::new(&config);

        let report = orchestrator.run_cycle(10);
        assert_eq!(report.bitcoin.successes, 10);
        assert_eq!(report.redcode.successes, 10);
        assert!(report.redcode_rewards > 0.0);
        assert_eq!(orchestrator.balance(Some("RDC_MINER_MAIN")), report.redcode_rewards);
    }

    #[test]
    fn test_rates_use_unit_window_when_stopped() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        orchestrator.run_cycle(3);
        // 3 hashes over 1s, scaled by 1000/100 for Bitcoin and 500/100 for Monero
        let rates = orchestrator.mining_rates();
        assert_eq!(rates[&CoinKind::Bitcoin], 30.0);
        assert_eq!(rates[&CoinKind::Monero], 15.0);
    }

    #[test]
    fn test_start_stop_toggle() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        orchestrator.start();
        assert!(orchestrator.is_running());
        assert!(orchestrator.snapshot().running);
        orchestrator.stop();
        assert!(!orchestrator.is_running());
        assert!(!orchestrator.snapshot().running);
    }

    #[test]
    fn test_set_price_shows_in_snapshot() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        orchestrator.set_price(CoinKind::Monero, 150.5);
        orchestrator.set_price(CoinKind::RedCode, 2.0);
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.miner(CoinKind::Monero).unwrap().usd_price, 150.5);
        assert_eq!(snapshot.miner(CoinKind::Bitcoin).unwrap().usd_price, 82_633.0);
        assert_eq!(snapshot.ledger.usd_price, 2.0);
    }

    #[test]
    fn test_snapshot_contents() {
        let mut config = seeded_config();
        config.features.insert("quantum_5d_strategy".into(), true);
        let mut orchestrator = MiningOrchestrator::new(&config);
        orchestrator.connect_monero_wallet("127.0.0.1", 18081);
        orchestrator.relay("AI1", "AI2", "Hello quantum world");
        orchestrator.record_wallet_status(WalletReport::new(true, "wallet online"));
        orchestrator.record_reward_push(
            WalletReport::new(false, "node unreachable")
                .with_detail(serde_json::json!({"code": 503})),
        );
        orchestrator.run_cycle(1);

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.ledger.symbol, "RDC");
        assert_eq!(snapshot.ledger.total_supply, 1_000_000_000);
        assert_eq!(snapshot.ledger.mining_address, "RDC_MINER_MAIN");
        assert_eq!(snapshot.miners.len(), 3);
        assert_eq!(snapshot.relayed_messages, 1);
        assert_eq!(snapshot.features.get("quantum_5d_strategy"), Some(&true));
        assert_eq!(snapshot.wallet_status.as_ref().unwrap().message, "wallet online");
        assert_eq!(snapshot.reward_pushes[0].detail["code"], 503);
        assert_eq!(snapshot.reward_push_total, 1);

        let monero = snapshot.miner(CoinKind::Monero).unwrap();
        assert_eq!(monero.pool_name, "SupportXMR");
        assert_eq!(monero.wallet.as_ref().unwrap().port, 18081);
        assert!(snapshot.miner(CoinKind::Bitcoin).unwrap().wallet.is_none());
        assert_eq!(snapshot.scoring, orchestrator.scoring_state());
    }

    #[test]
    fn test_reward_push_history_is_bounded() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        for i in 0..REWARD_PUSH_HISTORY + 5 {
            orchestrator.record_reward_push(WalletReport::new(true, format!("push {}", i)));
        }

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.reward_pushes.len(), REWARD_PUSH_HISTORY);
        assert_eq!(snapshot.reward_push_total, (REWARD_PUSH_HISTORY + 5) as u64);
        assert_eq!(snapshot.reward_pushes[0].message, "push 5");
        assert_eq!(
            snapshot.reward_pushes.last().unwrap().message,
            format!("push {}", REWARD_PUSH_HISTORY + 4)
        );
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        orchestrator.run_cycle(2);
        let json = serde_json::to_value(orchestrator.snapshot()).unwrap();
        assert_eq!(json["ledger"]["symbol"], "RDC");
        assert!(json["miners"]["bitcoin"]["value_display"]
            .as_str()
            .unwrap()
            .ends_with("USD/hash"));
        assert!(json["scoring"]["100d"].is_number());
    }

    #[test]
    fn test_relay_round_trip_and_transfer() {
        let mut orchestrator = MiningOrchestrator::new(&seeded_config());
        let encrypted = orchestrator.relay("AI1", "AI2", "Test quantum communication");
        assert_eq!(
            orchestrator.decrypt(&encrypted).unwrap(),
            "Test quantum communication"
        );
        assert_eq!(orchestrator.relay_log().len(), 1);

        assert!(orchestrator.transfer("RDC_MINER_MAIN", "B", 1.0).is_err());
    }
}
