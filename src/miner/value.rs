// src/miner/value.rs
//! USD value-per-hash estimates

use serde::Serialize;
use std::fmt;

/// Divisor used when no usable network hash rate is known.
pub const FALLBACK_NETWORK_HASHRATE: f64 = 1e9;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_MONTH: f64 = 2_592_000.0;

/// Value-per-hash figures for one miner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HashValue {
    /// USD earned per hash
    pub value_per_hash: f64,
    /// Projected USD per hour at the current display rate
    pub hourly: f64,
    /// Projected USD per day
    pub daily: f64,
    /// Projected USD per 30-day month
    pub monthly: f64,
    /// USD value of every hash computed so far
    pub total_value_generated: f64,
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.6e} USD/hash", self.value_per_hash)
    }
}

/// Parses a network hash rate such as `"600 EH/s"` into hashes per second.
///
/// Units are case-insensitive and whitespace between number and unit is
/// optional. The number may use exponent notation (`"1.2e3 TH/s"`).
/// Returns `None` for anything else, including `"N/A"`.
pub fn parse_network_hashrate(text: &str) -> Option<f64> {
    let text = text.trim();
    // the unit suffix never contains digits or a decimal point
    let split = text.rfind(|c: char| c.is_ascii_digit() || c == '.')? + 1;
    let (number, unit) = text.split_at(split);

    let value: f64 = number.trim().parse().ok()?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "H/S" => 1.0,
        "KH/S" => 1e3,
        "MH/S" => 1e6,
        "GH/S" => 1e9,
        "TH/S" => 1e12,
        "PH/S" => 1e15,
        "EH/S" => 1e18,
        _ => return None,
    };

    value.is_finite().then_some(value * multiplier)
}

/// Computes value per hash and its projections.
///
/// Zero-filled while `hash_rate` is zero. A network rate that fails to parse,
/// or is not positive, falls back to [`FALLBACK_NETWORK_HASHRATE`].
pub fn value_per_hash(
    hash_rate: f64,
    total_hashes: u64,
    network_hashrate: &str,
    block_reward: f64,
    usd_price: f64,
) -> HashValue {
    if hash_rate == 0.0 {
        return HashValue::default();
    }

    let value_per_hash = match parse_network_hashrate(network_hashrate) {
        Some(network) if network > 0.0 => (1.0 / network) * block_reward * usd_price,
        _ => block_reward * usd_price / FALLBACK_NETWORK_HASHRATE,
    };

    HashValue {
        value_per_hash,
        hourly: value_per_hash * hash_rate * SECONDS_PER_HOUR,
        daily: value_per_hash * hash_rate * SECONDS_PER_DAY,
        monthly: value_per_hash * hash_rate * SECONDS_PER_MONTH,
        total_value_generated: value_per_hash * total_hashes as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_network_hashrate("600 EH/s"), Some(600.0 * 1e18));
        assert_eq!(parse_network_hashrate("2.5 GH/s"), Some(2.5 * 1e9));
        assert_eq!(parse_network_hashrate("12kh/s"), Some(12.0 * 1e3));
        assert_eq!(parse_network_hashrate("  7 h/S "), Some(7.0));
        assert_eq!(parse_network_hashrate("3 PH/s"), Some(3.0 * 1e15));
    }

    #[test]
    fn test_parse_exponent_numbers() {
        assert_eq!(parse_network_hashrate("1e3 H/s"), Some(1e3));
        assert_eq!(parse_network_hashrate("1.2E3 TH/s"), Some(1.2e3 * 1e12));
        assert_eq!(parse_network_hashrate("5e-1kh/s"), Some(5e-1 * 1e3));
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        assert_eq!(parse_network_hashrate("N/A"), None);
        assert_eq!(parse_network_hashrate(""), None);
        assert_eq!(parse_network_hashrate("5 ZH/s"), None);
        assert_eq!(parse_network_hashrate("600"), None);
        assert_eq!(parse_network_hashrate("fast EH/s"), None);
    }

    #[test]
    fn test_zero_rate_is_zero_filled() {
        let value = value_per_hash(0.0, 1_000, "600 EH/s", 3.125, 82_633.0);
        assert_eq!(value, HashValue::default());
    }

    #[test]
    fn test_known_network_rate() {
        let value = value_per_hash(100.0, 10, "1 KH/s", 2.0, 5.0);
        let vph = (1.0 / 1e3) * 2.0 * 5.0;
        assert_eq!(value.value_per_hash, vph);
        assert_eq!(value.hourly, vph * 100.0 * 3600.0);
        assert_eq!(value.daily, vph * 100.0 * 86_400.0);
        assert_eq!(value.monthly, vph * 100.0 * 2_592_000.0);
        assert_eq!(value.total_value_generated, vph * 10.0);
    }

    #[test]
    fn test_fallback_for_unparseable_or_zero_rate() {
        let expected = 50.0 * 1.0 / 1e9;
        assert_eq!(value_per_hash(1.0, 0, "N/A", 50.0, 1.0).value_per_hash, expected);
        assert_eq!(value_per_hash(1.0, 0, "0 GH/s", 50.0, 1.0).value_per_hash, expected);
    }

    #[test]
    fn test_display_format() {
        let value = HashValue {
            value_per_hash: 5e-8,
            ..HashValue::default()
        };
        assert_eq!(value.to_string(), "$5.000000e-8 USD/hash");
    }
}
