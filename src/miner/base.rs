// src/miner/base.rs
//! State and behaviour shared by every coin miner
//!
//! A share is accepted when the SHA-256 digest of the payload, salted with
//! the scoring engine's `5d` and `10d` slots, starts with `difficulty` hex
//! zeros. This is a fixed-probability gate (about `16^-difficulty` per
//! attempt), not proof of work against a real target.

use crate::config::MinerSettings;
use crate::miner::value::{HashValue, value_per_hash};
use crate::scoring::{ScoringEngine, SharedEngine};
use crate::types::CoinKind;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{MutexGuard, PoisonError};

/// Length of a hex digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Display-only pool metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Pool name shown on the dashboard
    pub pool_name: String,
    /// Pool URL shown on the dashboard
    pub pool_url: String,
    /// Network hash rate with unit, e.g. `"600 EH/s"`
    pub network_hashrate: String,
    /// Coins paid per block
    pub block_reward: f64,
}

/// Resolved settings for one miner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerProfile {
    /// Display-rate ceiling in H/s
    pub expected_hashrate: f64,
    /// Initial USD price
    pub usd_price: f64,
    /// Leading zero hex digits the orchestrator asks for
    pub difficulty: u32,
    /// Dashboard mode flag
    pub simulated: bool,
    /// Pool metadata
    pub pool: PoolInfo,
}

impl MinerProfile {
    /// Built-in profile for a coin
    pub fn builtin(coin: CoinKind) -> Self {
        let (expected_hashrate, usd_price, difficulty, pool_name, pool_url, network, reward) =
            match coin {
                CoinKind::Bitcoin => (
                    1000.0,
                    82_633.0,
                    4,
                    "F2Pool",
                    "stratum+tcp://btc.f2pool.com:1314",
                    "600 EH/s",
                    3.125,
                ),
                CoinKind::Monero => (
                    500.0,
                    405.0,
                    4,
                    "SupportXMR",
                    "stratum+tcp://pool.supportxmr.com:3333",
                    "2.5 GH/s",
                    0.6,
                ),
                // No network figure: value per hash uses the fallback formula.
                CoinKind::RedCode => (
                    1000.0,
                    1.0,
                    3,
                    "RedCode Native",
                    "local://redcode",
                    "N/A",
                    50.0,
                ),
            };

        MinerProfile {
            expected_hashrate,
            usd_price,
            difficulty,
            simulated: true,
            pool: PoolInfo {
                pool_name: pool_name.into(),
                pool_url: pool_url.into(),
                network_hashrate: network.into(),
                block_reward: reward,
            },
        }
    }

    /// Built-in profile with configuration overrides applied
    pub fn from_settings(coin: CoinKind, settings: &MinerSettings) -> Self {
        let mut profile = Self::builtin(coin);
        if let Some(rate) = settings.expected_hashrate {
            profile.expected_hashrate = rate;
        }
        if let Some(price) = settings.usd_price {
            profile.usd_price = price;
        }
        if let Some(difficulty) = settings.difficulty {
            profile.difficulty = difficulty;
        }
        profile.simulated = settings.simulated;
        if let Some(name) = &settings.pool_name {
            profile.pool.pool_name = name.clone();
        }
        if let Some(url) = &settings.pool_url {
            profile.pool.pool_url = url.clone();
        }
        if let Some(network) = &settings.network_hashrate {
            profile.pool.network_hashrate = network.clone();
        }
        if let Some(reward) = settings.block_reward {
            profile.pool.block_reward = reward;
        }
        profile
    }
}

/// Outcome of one mining attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Whether the digest met the difficulty
    pub success: bool,
    /// Lowercase hex digest, always [`DIGEST_HEX_LEN`] characters
    pub digest: String,
}

/// Counters, metadata and the shared engine handle of one miner
#[derive(Debug)]
pub struct MinerCore {
    coin: CoinKind,
    engine: SharedEngine,
    profile: MinerProfile,
    hash_rate: f64,
    shares_found: u64,
    total_hashes: u64,
    usd_price: f64,
}

impl MinerCore {
    /// Creates an idle miner with zeroed counters.
    pub fn new(coin: CoinKind, engine: SharedEngine, profile: MinerProfile) -> Self {
        MinerCore {
            coin,
            engine,
            usd_price: profile.usd_price,
            profile,
            hash_rate: 0.0,
            shares_found: 0,
            total_hashes: 0,
        }
    }

    /// Locks the shared engine. A poisoned lock still holds plain floats,
    /// so the guard is recovered instead of propagating.
    pub(crate) fn engine(&self) -> MutexGuard<'_, ScoringEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// SHA-256 hex of `"{payload}:{5d}:{10d}"` using the current scoring state.
    pub fn compute_digest(&self, payload: &str) -> String {
        let state = self.engine().state();
        let enhanced = format!(
            "{}:{}:{}",
            payload,
            render_float(state.d5),
            render_float(state.d10)
        );
        hex::encode(Sha256::digest(enhanced.as_bytes()))
    }

    /// One mining attempt at `difficulty` leading hex zeros.
    pub fn attempt(&mut self, difficulty: u32) -> Attempt {
        self.total_hashes += 1;
        let now_micros = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        let nonce = now_micros.wrapping_add(self.total_hashes);
        let digest = self.compute_digest(&format!("{}:{}", self.coin.miner_name(), nonce));

        let success = meets_difficulty(&digest, difficulty);
        if success {
            self.shares_found += 1;
            log::debug!(
                "{} share #{} at difficulty {}: {}",
                self.coin.miner_name(),
                self.shares_found,
                difficulty,
                digest
            );
        }
        Attempt { success, digest }
    }

    /// Throttled display rate: `min(total/elapsed * expected/100, expected)`.
    ///
    /// A non-positive window leaves the previous value in place.
    pub fn reported_rate(&mut self, elapsed_secs: f64) -> f64 {
        if elapsed_secs > 0.0 {
            let expected = self.profile.expected_hashrate;
            let raw = self.total_hashes as f64 / elapsed_secs;
            self.hash_rate = (raw * (expected / 100.0)).min(expected);
        }
        self.hash_rate
    }

    /// USD value per hash and its projections at the current display rate.
    pub fn value_per_hash(&self) -> HashValue {
        value_per_hash(
            self.hash_rate,
            self.total_hashes,
            &self.profile.pool.network_hashrate,
            self.profile.pool.block_reward,
            self.usd_price,
        )
    }

    /// Coin profile tag
    pub fn coin(&self) -> CoinKind {
        self.coin
    }

    /// Resolved profile
    pub fn profile(&self) -> &MinerProfile {
        &self.profile
    }

    /// Last reported display rate
    pub fn hash_rate(&self) -> f64 {
        self.hash_rate
    }

    /// Accepted shares so far
    pub fn shares_found(&self) -> u64 {
        self.shares_found
    }

    /// Attempts so far
    pub fn total_hashes(&self) -> u64 {
        self.total_hashes
    }

    /// Current USD price
    pub fn usd_price(&self) -> f64 {
        self.usd_price
    }

    /// Replaces the USD price
    pub fn set_usd_price(&mut self, usd_price: f64) {
        self.usd_price = usd_price;
    }

    #[cfg(test)]
    pub(crate) fn set_total_hashes(&mut self, total: u64) {
        self.total_hashes = total;
    }
}

/// Shortest round-trip text for a float, with a trailing `.0` on integral
/// values, lowercase `nan`/`inf`, and exponents signed and padded to two
/// digits (`1.5e-05`, `1e+16`).
pub fn render_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Whether the first `difficulty` characters of `digest` are all `'0'`.
///
/// A difficulty longer than the digest can never be met.
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    digest.len() >= difficulty && digest.bytes().take(difficulty).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn core(coin: CoinKind) -> MinerCore {
        MinerCore::new(
            coin,
            ScoringEngine::seeded(9).into_shared(),
            MinerProfile::builtin(coin),
        )
    }

    #[test]
    fn test_digest_salts_payload_with_scoring_state() {
        let miner = core(CoinKind::Bitcoin);
        // fresh engine: both slots render as "0.0"
        let expected = hex!("338cb57135f91287256584a75f80e6ff214ee11e9f64789ea776325d164a1c95");
        assert_eq!(miner.compute_digest("Bitcoin:1"), hex::encode(expected));

        miner.engine().score5(&[1.0, 2.0, 3.0]);
        assert_ne!(miner.compute_digest("Bitcoin:1"), hex::encode(expected));
    }

    #[test]
    fn test_render_float_layout() {
        assert_eq!(render_float(0.0), "0.0");
        assert_eq!(render_float(12.0), "12.0");
        assert_eq!(render_float(0.25), "0.25");
        assert_eq!(render_float(1.5e-5), "1.5e-05");
        assert_eq!(render_float(1e16), "1e+16");
        assert_eq!(render_float(-2.5e-123), "-2.5e-123");
        assert_eq!(render_float(f64::NAN), "nan");
        assert_eq!(render_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_digest_uses_padded_exponents() {
        let miner = core(CoinKind::Bitcoin);
        miner.engine().score5(&[0.001, 0.002]);
        // 0.003 * 0.0015
        let d5 = miner.engine().state().d5;
        assert!(d5 < 1e-4);
        let expected = hex::encode(Sha256::digest(
            format!("x:{}:0.0", render_float(d5)).as_bytes(),
        ));
        assert_eq!(miner.compute_digest("x"), expected);
        assert!(render_float(d5).contains("e-0"));
    }

    #[test]
    fn test_digest_is_fixed_length_lowercase_hex() {
        let miner = core(CoinKind::Monero);
        let digest = miner.compute_digest("anything at all");
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_difficulty_zero_always_succeeds() {
        let mut miner = core(CoinKind::Bitcoin);
        for _ in 0..100 {
            assert!(miner.attempt(0).success);
        }
        assert_eq!(miner.shares_found(), 100);
        assert_eq!(miner.total_hashes(), 100);
    }

    #[test]
    fn test_difficulty_one_finds_shares() {
        let mut miner = core(CoinKind::Monero);
        let found = (0..10_000).filter(|_| miner.attempt(1).success).count();
        // expected around 625
        assert!(found > 0);
        assert_eq!(miner.shares_found(), found as u64);
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00ab", 2));
        assert!(!meets_difficulty("0a0b", 2));
        assert!(meets_difficulty("abc", 0));
        assert!(!meets_difficulty(&"0".repeat(64), 65));
        assert!(meets_difficulty(&"0".repeat(64), 64));
    }

    #[test]
    fn test_reported_rate_clamps_at_expected() {
        let mut miner = core(CoinKind::Bitcoin);
        miner.set_total_hashes(1_000_000);
        assert_eq!(miner.reported_rate(1.0), 1000.0);
        assert_eq!(miner.hash_rate(), miner.profile().expected_hashrate);
    }

    #[test]
    fn test_reported_rate_scales_below_ceiling() {
        let mut miner = core(CoinKind::Bitcoin);
        miner.set_total_hashes(50);
        // 50 H/s raw * (1000 / 100) = 500
        assert_eq!(miner.reported_rate(1.0), 500.0);
        // a non-positive window keeps the previous value
        assert_eq!(miner.reported_rate(0.0), 500.0);
    }

    #[test]
    fn test_profile_overrides() {
        let settings = MinerSettings {
            expected_hashrate: Some(42.0),
            network_hashrate: Some("1 TH/s".into()),
            simulated: false,
            ..MinerSettings::default()
        };
        let profile = MinerProfile::from_settings(CoinKind::Monero, &settings);
        assert_eq!(profile.expected_hashrate, 42.0);
        assert_eq!(profile.pool.network_hashrate, "1 TH/s");
        assert_eq!(profile.pool.pool_name, "SupportXMR");
        assert_eq!(profile.difficulty, 4);
        assert!(!profile.simulated);
    }
}
