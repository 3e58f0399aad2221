// src/ledger/mod.rs
//! RedCode Coin ledger
//!
//! Holds balances and the transfer log. The orchestrator owns the single
//! instance and lends it to the RedCode miner for each mining call.

/// Balance store, transfers and mints
pub mod token;

pub use token::{DECIMALS, Ledger, SYMBOL, TOTAL_SUPPLY, Transaction, TransferError};
