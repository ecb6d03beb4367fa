//! # Balance Ledger
//!
//! Per-owner token balance rows and the derived portfolio total. The ledger
//! owns the in-memory snapshot for the active wallet; every mutation writes
//! through the persistence backend first and commits to the snapshot only
//! on success, so a failed write leaves the last known good state intact.
//!
//! The aggregate USD value is derived, never stored: it is recomputed from
//! the snapshot after every read or mutation.
//!
//! Amounts are `f64`, matching the persisted record format. They are
//! bookkeeping values validated non-negative and finite on every mutation;
//! no rounding policy is applied here -- formatting is the display layer's
//! concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{BackendError, WalletBackend};
use crate::token::{self, TokenInfo};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A balance or USD value was negative, NaN, or infinite.
    #[error("amounts must be non-negative finite numbers")]
    InvalidAmount,

    /// The persistence backend rejected the operation. The in-memory
    /// snapshot is unchanged when this is returned.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// ---------------------------------------------------------------------------
// BalanceEntry
// ---------------------------------------------------------------------------

/// One token's balance row for an owner.
///
/// `(owner_id, token_symbol)` is the composite key: the ledger never holds
/// two rows for the same token, and backends replace by that key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub owner_id: String,
    pub token_symbol: String,
    pub token_name: String,
    pub balance: f64,
    pub usd_value: f64,
    pub updated_at: DateTime<Utc>,
}

impl BalanceEntry {
    /// A zero row for a seeded token.
    pub fn zero(owner_id: &str, info: &TokenInfo) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            token_symbol: info.symbol.to_string(),
            token_name: info.name.to_string(),
            balance: 0.0,
            usd_value: 0.0,
            updated_at: Utc::now(),
        }
    }

    fn showcase(owner_id: &str, info: &TokenInfo, balance: f64, usd_value: f64) -> Self {
        Self {
            balance,
            usd_value,
            ..Self::zero(owner_id, info)
        }
    }
}

/// The showcase balances a fresh demo wallet starts with.
///
/// Anonymous users see a populated portfolio rather than three zeros;
/// these figures come straight from the original demo data set.
pub fn demo_entries(owner_id: &str) -> Vec<BalanceEntry> {
    vec![
        BalanceEntry::showcase(owner_id, &token::WEGRAM, 1247.89, 623.95),
        BalanceEntry::showcase(owner_id, &token::SOLANA, 2.45, 367.50),
        BalanceEntry::showcase(owner_id, &token::USD_COIN, 150.00, 150.00),
    ]
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The balance snapshot and aggregate for one owner.
///
/// Not `Sync` and not meant to be: all wallet operations run on the UI's
/// single logical thread. Sequential mutations always observe each other
/// because every operation reads this live snapshot, never a stale copy.
#[derive(Clone, Debug)]
pub struct Ledger {
    owner_id: String,
    entries: Vec<BalanceEntry>,
    total_usd: f64,
}

impl Ledger {
    /// Creates an empty ledger for an owner.
    pub fn new(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            entries: Vec::new(),
            total_usd: 0.0,
        }
    }

    /// The owner this ledger is scoped to.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Current balance rows, in seed/display order.
    pub fn entries(&self) -> &[BalanceEntry] {
        &self.entries
    }

    /// The derived portfolio total: sum of `usd_value` across all rows.
    pub fn total_usd(&self) -> f64 {
        self.total_usd
    }

    /// Writes the fixed three-token set at zero and adopts it as the
    /// snapshot. Called once, right after wallet creation.
    pub fn seed_initial(&mut self, backend: &mut dyn WalletBackend) -> Result<(), LedgerError> {
        let entries: Vec<BalanceEntry> = token::SEED_TOKENS
            .iter()
            .map(|info| BalanceEntry::zero(&self.owner_id, info))
            .collect();
        self.commit(backend, entries)
    }

    /// Writes the demo showcase balances and adopts them as the snapshot.
    /// Used when a fresh local wallet is created.
    pub fn seed_demo(&mut self, backend: &mut dyn WalletBackend) -> Result<(), LedgerError> {
        let entries = demo_entries(&self.owner_id);
        self.commit(backend, entries)
    }

    /// Reloads the snapshot from the backend and recomputes the aggregate.
    pub fn fetch(&mut self, backend: &mut dyn WalletBackend) -> Result<(), LedgerError> {
        let entries = backend.get_balances(&self.owner_id)?;
        self.entries = entries;
        self.recompute_total();
        Ok(())
    }

    /// Upserts the row for `symbol` with an absolute balance and USD value.
    ///
    /// The backend write happens first; the snapshot and aggregate are
    /// updated only if it succeeds. On failure the prior state is untouched
    /// and the error is returned for the caller to handle or discard.
    pub fn update_balance(
        &mut self,
        backend: &mut dyn WalletBackend,
        symbol: &str,
        new_balance: f64,
        new_usd_value: f64,
    ) -> Result<(), LedgerError> {
        if !valid_amount(new_balance) || !valid_amount(new_usd_value) {
            return Err(LedgerError::InvalidAmount);
        }

        let now = Utc::now();
        let mut next = self.entries.clone();
        match next.iter_mut().find(|e| e.token_symbol == symbol) {
            Some(entry) => {
                entry.balance = new_balance;
                entry.usd_value = new_usd_value;
                entry.updated_at = now;
            }
            None => next.push(BalanceEntry {
                owner_id: self.owner_id.clone(),
                token_symbol: symbol.to_string(),
                token_name: token::name_for(symbol).unwrap_or(symbol).to_string(),
                balance: new_balance,
                usd_value: new_usd_value,
                updated_at: now,
            }),
        }

        self.commit(backend, next)
    }

    /// Credits a reward on top of the current balance for `symbol`.
    ///
    /// The new USD value is derived from the fixed price table:
    /// `new_balance * price(symbol)`. A reward for a token the ledger does
    /// not hold is a no-op; rewards never create rows.
    pub fn add_reward(
        &mut self,
        backend: &mut dyn WalletBackend,
        amount: f64,
        symbol: &str,
    ) -> Result<(), LedgerError> {
        if !valid_amount(amount) {
            return Err(LedgerError::InvalidAmount);
        }

        let Some(current) = self.entries.iter().find(|e| e.token_symbol == symbol) else {
            tracing::debug!(symbol, "reward for a token the wallet does not hold; ignoring");
            return Ok(());
        };

        let new_balance = current.balance + amount;
        let new_usd_value = new_balance * token::price_usd(symbol);
        self.update_balance(backend, symbol, new_balance, new_usd_value)
    }

    /// Drops the snapshot. Used by reset after the backend is cleared.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_usd = 0.0;
    }

    /// Writes `entries` through the backend, then adopts them.
    fn commit(
        &mut self,
        backend: &mut dyn WalletBackend,
        entries: Vec<BalanceEntry>,
    ) -> Result<(), LedgerError> {
        backend.put_balances(&self.owner_id, &entries)?;
        self.entries = entries;
        self.recompute_total();
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total_usd = self.entries.iter().map(|e| e.usd_value).sum();
    }
}

fn valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
