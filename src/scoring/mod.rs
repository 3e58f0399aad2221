// src/scoring/mod.rs
//! Numeric scoring derivations
//!
//! The engine produces the 4-slot state vector used as a reward multiplier
//! and as salt for share digests.

/// Scoring engine and its state vector
pub mod engine;

pub use engine::{ScoringEngine, ScoringState, ScoringTag, SharedEngine};
