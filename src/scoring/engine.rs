// src/scoring/engine.rs
//! Four-slot numeric scoring engine
//!
//! Each derivation stores its last result under a fixed tag. The values are
//! consumed as multipliers by the RedCode miner and folded into every share
//! digest, so the engine is shared between miners (see [`SharedEngine`]).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Handle to the single engine shared by all miners of one orchestrator.
pub type SharedEngine = Arc<Mutex<ScoringEngine>>;

/// Tags for the four derivations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScoringTag {
    /// `sum * mean` over a sample
    D5,
    /// Random product accumulation
    D10,
    /// Recursive square-root tree
    D100,
    /// Damped trigonometric sum
    D1000,
}

impl ScoringTag {
    /// The textual tag used in snapshots (`"5d"` ... `"1000d"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringTag::D5 => "5d",
            ScoringTag::D10 => "10d",
            ScoringTag::D100 => "100d",
            ScoringTag::D1000 => "1000d",
        }
    }
}

/// Last computed value per tag. All slots start at `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringState {
    /// Last `score5` result
    #[serde(rename = "5d")]
    pub d5: f64,
    /// Last `score10` result
    #[serde(rename = "10d")]
    pub d10: f64,
    /// Last `score100` result
    #[serde(rename = "100d")]
    pub d100: f64,
    /// Last `score1000` result
    #[serde(rename = "1000d")]
    pub d1000: f64,
}

impl ScoringState {
    /// Reads one slot by tag.
    pub fn get(&self, tag: ScoringTag) -> f64 {
        match tag {
            ScoringTag::D5 => self.d5,
            ScoringTag::D10 => self.d10,
            ScoringTag::D100 => self.d100,
            ScoringTag::D1000 => self.d1000,
        }
    }
}

/// Engine computing the four derivations
///
/// Randomness is drawn from an owned [`StdRng`] so a seeded engine is
/// reproducible end to end.
#[derive(Debug)]
pub struct ScoringEngine {
    state: ScoringState,
    rng: StdRng,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Creates an engine seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an engine with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates an engine around an explicit random source.
    pub fn with_rng(rng: StdRng) -> Self {
        ScoringEngine {
            state: ScoringState::default(),
            rng,
        }
    }

    /// Wraps the engine into the handle miners share.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// `n` fresh uniform draws in `[0, 1)`.
    pub fn draw_uniform(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.rng.gen_range(0.0..1.0)).collect()
    }

    /// `sum(values) * mean(values)`, stored under `5d`.
    ///
    /// An empty sample scores `0.0`, not the NaN that `sum * mean` would
    /// produce, so share digests never carry `nan`.
    pub fn score5(&mut self, values: &[f64]) -> f64 {
        let result = if values.is_empty() {
            0.0
        } else {
            let sum: f64 = values.iter().sum();
            sum * (sum / values.len() as f64)
        };
        self.state.d5 = result;
        result
    }

    /// Sum over `i` of the product of 10 fresh draws times `i + 1`, stored
    /// under `10d`.
    pub fn score10(&mut self, iterations: usize) -> f64 {
        let mut total = 0.0;
        for i in 0..iterations {
            let layer: f64 = (0..10).map(|_| self.rng.gen_range(0.0..1.0)).product();
            total += layer * (i + 1) as f64;
        }
        self.state.d10 = total;
        total
    }

    /// `f(0)` where `f(level) = 1` at `depth` and `sqrt(2 * f(level + 1))`
    /// below it, stored under `100d`.
    pub fn score100(&mut self, depth: u32) -> f64 {
        let result = fractal_branch(0, depth);
        self.state.d100 = result;
        result
    }

    /// Sum over `d in 0..100` of `sin(d r) * cos(d r / 2) * (d + 1)`, stored
    /// under `1000d`.
    pub fn score1000(&mut self, flow_rate: f64) -> f64 {
        let result: f64 = (0..100u32)
            .map(|d| {
                let x = d as f64 * flow_rate;
                x.sin() * (x * 0.5).cos() * (d + 1) as f64
            })
            .sum();
        self.state.d1000 = result;
        result
    }

    /// Copy of the current state vector.
    pub fn state(&self) -> ScoringState {
        self.state
    }
}

fn fractal_branch(level: u32, depth: u32) -> f64 {
    if level >= depth {
        return 1.0;
    }
    (2.0 * fractal_branch(level + 1, depth)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score100_golden_values() {
        let mut engine = ScoringEngine::seeded(0);
        assert_eq!(engine.score100(0), 1.0);
        assert_eq!(engine.score100(1), 2.0f64.sqrt());
        assert_eq!(engine.score100(5), 1.9571441241754002);
        assert_eq!(engine.score100(5).to_bits(), 0x3fff_5076_5b6e_4540);
        assert_eq!(engine.state().d100, 1.9571441241754002);
    }

    #[test]
    fn test_score1000_is_deterministic() {
        let mut a = ScoringEngine::seeded(1);
        let mut b = ScoringEngine::seeded(2);
        assert_eq!(a.score1000(1.5).to_bits(), b.score1000(1.5).to_bits());
        assert_eq!(a.score1000(1.0), a.score1000(1.0));
        // d = 0 contributes nothing, so a zero flow rate sums to zero
        assert_eq!(a.score1000(0.0), 0.0);
    }

    #[test]
    fn test_score5_sum_times_mean() {
        let mut engine = ScoringEngine::seeded(0);
        assert_eq!(engine.score5(&[1.0, 2.0, 3.0]), 12.0);
        assert_eq!(engine.state().get(ScoringTag::D5), 12.0);
        assert_eq!(engine.score5(&[]), 0.0);
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = ScoringEngine::seeded(42);
        let mut b = ScoringEngine::seeded(42);
        assert_eq!(a.score10(100).to_bits(), b.score10(100).to_bits());
        assert_eq!(a.draw_uniform(5), b.draw_uniform(5));

        let draws = a.draw_uniform(1000);
        assert!(draws.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_score10_bounds() {
        let mut engine = ScoringEngine::seeded(7);
        assert_eq!(engine.score10(0), 0.0);
        // each product lies in [0, 1), so the sum is below 1 + 2 + ... + n
        let value = engine.score10(50);
        assert!(value >= 0.0 && value < (50 * 51 / 2) as f64);
        assert_eq!(engine.state().d10, value);
    }

    #[test]
    fn test_state_starts_zeroed_and_serializes_tags() {
        let engine = ScoringEngine::seeded(0);
        assert_eq!(engine.state(), ScoringState::default());
        let json = serde_json::to_value(engine.state()).unwrap();
        for tag in ["5d", "10d", "100d", "1000d"] {
            assert_eq!(json[tag], 0.0);
        }
    }
}
