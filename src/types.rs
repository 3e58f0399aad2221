// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coin profiles mined by the dashboard
///
/// Each profile gets exactly one miner. Only [`CoinKind::RedCode`] touches
/// the in-process ledger; the other two are display-only simulations.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CoinKind {
    /// Bitcoin (BTC), SHA-256 label
    #[value(name = "bitcoin")]
    Bitcoin,

    /// Monero (XMR), RandomX label
    #[value(name = "monero")]
    Monero,

    /// RedCode Coin (RDC), minted into the local ledger
    #[value(name = "redcode")]
    RedCode,
}

impl CoinKind {
    /// All profiles in the order the orchestrator mines them.
    pub const ALL: [CoinKind; 3] = [CoinKind::Bitcoin, CoinKind::Monero, CoinKind::RedCode];

    /// Name used in share payloads (`"{name}:{nonce}"`).
    pub fn miner_name(&self) -> &'static str {
        match self {
            CoinKind::Bitcoin => "Bitcoin",
            CoinKind::Monero => "Monero",
            CoinKind::RedCode => "RedCode",
        }
    }

    /// Algorithm label shown on the dashboard. Not the hash actually used.
    pub fn algorithm(&self) -> &'static str {
        match self {
            CoinKind::Bitcoin => "SHA-256",
            CoinKind::Monero => "RandomX",
            CoinKind::RedCode => "QuantumProof",
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            CoinKind::Bitcoin => "BTC",
            CoinKind::Monero => "XMR",
            CoinKind::RedCode => "RDC",
        }
    }
}

impl fmt::Display for CoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinKind::Bitcoin => write!(f, "bitcoin"),
            CoinKind::Monero => write!(f, "monero"),
            CoinKind::RedCode => write!(f, "redcode"),
        }
    }
}

impl FromStr for CoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(CoinKind::Bitcoin),
            "monero" | "xmr" => Ok(CoinKind::Monero),
            "redcode" | "rdc" => Ok(CoinKind::RedCode),
            _ => Err(format!("Unknown coin: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_names_and_tickers() {
        assert_eq!("BTC".parse::<CoinKind>(), Ok(CoinKind::Bitcoin));
        assert_eq!("monero".parse::<CoinKind>(), Ok(CoinKind::Monero));
        assert_eq!("Rdc".parse::<CoinKind>(), Ok(CoinKind::RedCode));
        assert!("dogecoin".parse::<CoinKind>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for coin in CoinKind::ALL {
            assert_eq!(coin.to_string().parse::<CoinKind>(), Ok(coin));
        }
    }
}
