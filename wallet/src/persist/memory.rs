//! # In-Memory Backends
//!
//! Hash-map doubles for both external collaborators. Used throughout the
//! test suites and handy for demos; no production path constructs them.
//!
//! [`MemoryRemote`] carries a failure switch so tests can simulate an
//! unreachable service and exercise the fallback and log-and-ignore paths.

use std::collections::HashMap;

use super::local::KeyValueStore;
use super::remote::{BalanceRow, RemoteClient, TransportError, WalletRow};
use super::BackendResult;

// ---------------------------------------------------------------------------
// MemoryKv
// ---------------------------------------------------------------------------

/// A [`KeyValueStore`] over a `HashMap`. The moral equivalent of the
/// browser's `localStorage` for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> BackendResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> BackendResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryRemote
// ---------------------------------------------------------------------------

/// A [`RemoteClient`] over hash maps, one wallet row per owner and one
/// balance row per `(owner, token_symbol)`.
///
/// Flip [`set_failing`](Self::set_failing) and every operation returns a
/// transport error until it is flipped back, with stored rows untouched.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    wallets: HashMap<String, WalletRow>,
    balances: HashMap<String, Vec<BalanceRow>>,
    failing: bool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the service being unreachable.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Number of wallet rows held, across all owners. For assertions.
    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.failing {
            Err(TransportError::new("simulated outage"))
        } else {
            Ok(())
        }
    }
}

impl RemoteClient for MemoryRemote {
    fn select_wallet(&self, user_id: &str) -> Result<Option<WalletRow>, TransportError> {
        self.check()?;
        Ok(self.wallets.get(user_id).cloned())
    }

    fn insert_wallet(&mut self, row: &WalletRow) -> Result<(), TransportError> {
        self.check()?;
        self.wallets.insert(row.user_id.clone(), row.clone());
        Ok(())
    }

    fn select_balances(&self, user_id: &str) -> Result<Vec<BalanceRow>, TransportError> {
        self.check()?;
        Ok(self.balances.get(user_id).cloned().unwrap_or_default())
    }

    fn upsert_balances(&mut self, rows: &[BalanceRow]) -> Result<(), TransportError> {
        self.check()?;
        for row in rows {
            let owner_rows = self.balances.entry(row.user_id.clone()).or_default();
            match owner_rows
                .iter_mut()
                .find(|existing| existing.token_symbol == row.token_symbol)
            {
                Some(existing) => *existing = row.clone(),
                None => owner_rows.push(row.clone()),
            }
        }
        Ok(())
    }

    fn delete_wallet(&mut self, user_id: &str) -> Result<(), TransportError> {
        self.check()?;
        self.wallets.remove(user_id);
        self.balances.remove(user_id);
        Ok(())
    }
}
