// src/config/config.rs
use crate::{types::CoinKind, utils::error::MinerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for the mining dashboard
///
/// Every section is optional; a missing file section falls back to the
/// built-in coin profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Worker loop and randomness settings
    #[serde(default)]
    pub mining: MiningSettings,

    /// RedCode ledger settings
    #[serde(default)]
    pub ledger: LedgerSettings,

    /// Per-coin miner settings
    #[serde(default)]
    pub miners: MinerTable,

    /// Experiment feature toggles, passed through to snapshots untouched
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
}

/// Settings for the background worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningSettings {
    /// Rounds per `run_cycle` call made by the worker
    /// (default: 100)
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Pause between batches in milliseconds
    /// (default: 100)
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Poller cadence in seconds
    /// (default: 1)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,

    /// Fixed seed for the scoring engine; entropy-seeded when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for MiningSettings {
    fn default() -> Self {
        MiningSettings {
            batch_size: default_batch_size(),
            pause_ms: default_pause_ms(),
            report_interval_secs: default_report_interval(),
            rng_seed: None,
        }
    }
}

/// Settings for the RedCode ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Address credited with RedCode mining rewards
    #[serde(default = "default_mining_address")]
    pub mining_address: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            mining_address: default_mining_address(),
        }
    }
}

/// One settings block per coin profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerTable {
    /// `[miners.bitcoin]`
    #[serde(default)]
    pub bitcoin: MinerSettings,
    /// `[miners.monero]`
    #[serde(default)]
    pub monero: MinerSettings,
    /// `[miners.redcode]`
    #[serde(default)]
    pub redcode: MinerSettings,
}

/// Overrides for a single miner
///
/// Unset fields take the coin's built-in profile value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerSettings {
    /// Display-rate ceiling in H/s
    #[serde(default)]
    pub expected_hashrate: Option<f64>,

    /// Leading zero hex digits required for a share
    #[serde(default)]
    pub difficulty: Option<u32>,

    /// Shown as SIMULATION on the dashboard when true
    #[serde(default = "default_simulated")]
    pub simulated: bool,

    /// Initial USD price until a price collaborator reports one
    #[serde(default)]
    pub usd_price: Option<f64>,

    /// Pool display name
    #[serde(default)]
    pub pool_name: Option<String>,

    /// Pool display URL
    #[serde(default)]
    pub pool_url: Option<String>,

    /// Network hash rate with unit, e.g. `"600 EH/s"`
    #[serde(default)]
    pub network_hashrate: Option<String>,

    /// Coins per block
    #[serde(default)]
    pub block_reward: Option<f64>,
}

impl Default for MinerSettings {
    fn default() -> Self {
        MinerSettings {
            expected_hashrate: None,
            difficulty: None,
            simulated: default_simulated(),
            usd_price: None,
            pool_name: None,
            pool_url: None,
            network_hashrate: None,
            block_reward: None,
        }
    }
}

fn default_batch_size() -> u64 {
    100
}

fn default_pause_ms() -> u64 {
    100
}

fn default_report_interval() -> u64 {
    1
}

fn default_mining_address() -> String {
    "RDC_MINER_MAIN".into()
}

fn default_simulated() -> bool {
    true
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&config_str)
    }

    /// Parses and validates configuration text
    pub fn parse(text: &str) -> Result<Self, MinerError> {
        let config: Config = toml::from_str(text)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Settings block for one coin
    pub fn miner(&self, coin: CoinKind) -> &MinerSettings {
        match coin {
            CoinKind::Bitcoin => &self.miners.bitcoin,
            CoinKind::Monero => &self.miners.monero,
            CoinKind::RedCode => &self.miners.redcode,
        }
    }

    /// Whether an experiment feature is switched on (absent means off)
    pub fn feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    /// Rejects values the worker cannot run with
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.mining.batch_size == 0 {
            return Err(MinerError::ConfigError(
                "mining.batch_size must be at least 1".into(),
            ));
        }
        if self.ledger.mining_address.is_empty() {
            return Err(MinerError::ConfigError(
                "ledger.mining_address must not be empty".into(),
            ));
        }
        for coin in CoinKind::ALL {
            let settings = self.miner(coin);
            let non_negative = |v: Option<f64>| v.is_none_or(|v| v.is_finite() && v >= 0.0);
            if !non_negative(settings.expected_hashrate) {
                return Err(MinerError::ConfigError(format!(
                    "miners.{}.expected_hashrate must be a finite, non-negative number",
                    coin
                )));
            }
            if !non_negative(settings.usd_price) || !non_negative(settings.block_reward) {
                return Err(MinerError::ConfigError(format!(
                    "miners.{}: usd_price and block_reward must be finite and non-negative",
                    coin
                )));
            }
        }
        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# RedCode Miner Dashboard Configuration\n\n");
        template.push_str("[mining]\n");
        template.push_str("# Rounds per mining cycle\n");
        template.push_str("batch_size = 100\n");
        template.push_str("# Pause between cycles in milliseconds\n");
        template.push_str("pause_ms = 100\n");
        template.push_str("# Stats report cadence in seconds\n");
        template.push_str("report_interval_secs = 1\n");
        template.push_str("# Uncomment for reproducible scoring draws\n");
        template.push_str("# rng_seed = 42\n\n");

        template.push_str("[ledger]\n");
        template.push_str("mining_address = \"RDC_MINER_MAIN\"\n\n");

        template.push_str("# Every miner key is optional; omitted keys use built-in profiles\n");
        template.push_str("[miners.bitcoin]\n");
        template.push_str("expected_hashrate = 1000.0\n");
        template.push_str("difficulty = 4\n");
        template.push_str("simulated = true\n");
        template.push_str("# network_hashrate = \"600 EH/s\"\n\n");

        template.push_str("[miners.monero]\n");
        template.push_str("expected_hashrate = 500.0\n");
        template.push_str("difficulty = 4\n");
        template.push_str("simulated = true\n\n");

        template.push_str("[miners.redcode]\n");
        template.push_str("expected_hashrate = 1000.0\n");
        template.push_str("difficulty = 3\n");
        template.push_str("simulated = true\n\n");

        template.push_str("[features]\n");
        template.push_str("real_mining_mode = false\n");
        template.push_str("redcode_quantum_boost = true\n");
        template.push_str("quantum_5d_strategy = true\n");
        template.push_str("quantum_10d_tornado = true\n");
        template.push_str("quantum_100d_fractal = true\n");
        template.push_str("quantum_1000d_waterfall = true\n");

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mining.batch_size, 100);
        assert_eq!(config.ledger.mining_address, "RDC_MINER_MAIN");
        assert!(config.miners.bitcoin.simulated);
        assert!(!config.feature("real_mining_mode"));
    }

    #[test]
    fn test_template_parses() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config.miner(CoinKind::RedCode).difficulty, Some(3));
        assert_eq!(config.miner(CoinKind::Monero).expected_hashrate, Some(500.0));
        assert!(config.feature("quantum_100d_fractal"));
        assert_eq!(config.mining.rng_seed, None);
    }

    #[test]
    fn test_partial_miner_section() {
        let config = Config::parse(
            r#"
            [miners.monero]
            network_hashrate = "3 GH/s"
            "#,
        )
        .unwrap();
        let monero = config.miner(CoinKind::Monero);
        assert_eq!(monero.network_hashrate.as_deref(), Some("3 GH/s"));
        assert_eq!(monero.expected_hashrate, None);
        assert!(monero.simulated);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::parse("[mining]\nbatch_size = 0\n"),
            Err(MinerError::ConfigError(_))
        ));
        assert!(Config::parse("[miners.bitcoin]\nexpected_hashrate = -1.0\n").is_err());
        assert!(Config::parse("[miners.redcode]\nusd_price = nan\n").is_err());
        assert!(Config::parse("this is = = not toml").is_err());
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
