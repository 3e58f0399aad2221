// src/ledger/token.rs
//! RedCode Coin (RDC) balance store
//!
//! Address-keyed balances with transfer and mint. Transfers are logged;
//! mints are not. Minting is never capped against [`TOTAL_SUPPLY`], so the
//! circulating sum may exceed the nominal supply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Nominal token supply. Informational only.
pub const TOTAL_SUPPLY: u64 = 1_000_000_000;

/// Ticker of the ledger token.
pub const SYMBOL: &str = "RDC";

/// Display decimals of the ledger token.
pub const DECIMALS: u8 = 8;

/// Reasons a transfer is refused. Balances are untouched in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// The debited address has no wallet
    #[error("unknown source wallet: {0}")]
    UnknownSource(String),
    /// The debited wallet holds less than the requested amount
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance of the source wallet
        available: f64,
        /// Amount the caller tried to move
        requested: f64,
    },
}

/// One executed transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Debited address
    pub from: String,
    /// Credited address
    pub to: String,
    /// Amount moved
    pub amount: f64,
    /// Wall-clock time of execution
    pub timestamp: DateTime<Utc>,
}

/// In-process token ledger
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    wallets: HashMap<String, f64>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token ticker.
    pub fn symbol(&self) -> &'static str {
        SYMBOL
    }

    /// Nominal supply.
    pub fn total_supply(&self) -> u64 {
        TOTAL_SUPPLY
    }

    /// Display decimals.
    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Inserts a wallet, overwriting (not adding to) any existing balance.
    pub fn create_wallet(&mut self, address: &str, initial_balance: f64) {
        self.wallets.insert(address.to_string(), initial_balance);
    }

    /// Balance of `address`, `0.0` when unknown.
    pub fn balance(&self, address: &str) -> f64 {
        self.wallets.get(address).copied().unwrap_or(0.0)
    }

    /// Moves `amount` from `from` to `to`, creating `to` if needed.
    ///
    /// There is no guard against zero or negative amounts; a negative amount
    /// moves funds the other way.
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> Result<(), TransferError> {
        let available = *self
            .wallets
            .get(from)
            .ok_or_else(|| TransferError::UnknownSource(from.to_string()))?;
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        if let Some(balance) = self.wallets.get_mut(from) {
            *balance -= amount;
        }
        *self.wallets.entry(to.to_string()).or_insert(0.0) += amount;

        self.transactions.push(Transaction {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
        });
        log::trace!("transfer {} {} {} -> {}", amount, SYMBOL, from, to);
        Ok(())
    }

    /// Credits a mining reward, creating the wallet if needed.
    pub fn mint(&mut self, address: &str, amount: f64) {
        *self.wallets.entry(address.to_string()).or_insert(0.0) += amount;
    }

    /// Executed transfers, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sum of all balances.
    pub fn circulating(&self) -> f64 {
        self.wallets.values().sum()
    }

    /// Number of known addresses.
    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_scenario() {
        let mut ledger = Ledger::new();
        ledger.create_wallet("A", 100.0);
        assert!(ledger.transfer("A", "B", 40.0).is_ok());
        assert_eq!(ledger.balance("A"), 60.0);
        assert_eq!(ledger.balance("B"), 40.0);

        let tx = &ledger.transactions()[0];
        assert_eq!((tx.from.as_str(), tx.to.as_str(), tx.amount), ("A", "B", 40.0));
    }

    #[test]
    fn test_transfer_conserves_sum() {
        let cases = [(100.0, 0.0, 100.0), (100.0, 5.5, 0.0), (12.25, 1.0, 0.25)];
        for (a, b, amount) in cases {
            let mut ledger = Ledger::new();
            ledger.create_wallet("a", a);
            ledger.create_wallet("b", b);
            let before = ledger.balance("a") + ledger.balance("b");
            ledger.transfer("a", "b", amount).unwrap();
            assert_eq!(ledger.balance("a") + ledger.balance("b"), before);
        }
    }

    #[test]
    fn test_failed_transfers_change_nothing() {
        let mut ledger = Ledger::new();
        ledger.create_wallet("a", 10.0);
        ledger.create_wallet("b", 1.0);

        assert_eq!(
            ledger.transfer("a", "b", 10.5),
            Err(TransferError::InsufficientFunds {
                available: 10.0,
                requested: 10.5
            })
        );
        assert_eq!(
            ledger.transfer("ghost", "b", 1.0),
            Err(TransferError::UnknownSource("ghost".into()))
        );
        assert_eq!(ledger.balance("a"), 10.0);
        assert_eq!(ledger.balance("b"), 1.0);
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.wallet_count(), 2);
    }

    #[test]
    fn test_unknown_balance_is_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance("nobody"), 0.0);
    }

    #[test]
    fn test_create_wallet_overwrites() {
        let mut ledger = Ledger::new();
        ledger.create_wallet("a", 10.0);
        ledger.create_wallet("a", 3.0);
        assert_eq!(ledger.balance("a"), 3.0);
    }

    #[test]
    fn test_mint_accumulates_without_cap() {
        let mut ledger = Ledger::new();
        ledger.mint("miner", 25.0);
        ledger.mint("miner", 17.5);
        assert_eq!(ledger.balance("miner"), 42.5);

        ledger.mint("whale", TOTAL_SUPPLY as f64);
        assert!(ledger.circulating() > ledger.total_supply() as f64);
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_negative_amount_inverts_flow() {
        let mut ledger = Ledger::new();
        ledger.create_wallet("a", 0.0);
        ledger.create_wallet("b", 5.0);
        ledger.transfer("a", "b", -5.0).unwrap();
        assert_eq!(ledger.balance("a"), 5.0);
        assert_eq!(ledger.balance("b"), 0.0);
    }
}
