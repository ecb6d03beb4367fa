//! # Remote Backend
//!
//! Wallet persistence for authenticated sessions: rows in two hosted
//! tables, `user_wallets` and `wallet_balances`, both scoped by a
//! `user_id` foreign key.
//!
//! The hosted service itself is an external collaborator behind the
//! [`RemoteClient`] trait. Its contract is deliberately narrow: "no
//! matching row" is a normal `Ok(None)` / empty result, while anything
//! else that goes wrong is a [`TransportError`]. That distinction is load
//! bearing -- a missing row triggers first-time wallet creation, a
//! transport failure triggers fallback to local mode.
//!
//! The `_encrypted` column names are aspirational: the values are stored
//! as plaintext base58 today. The gap is tracked at the type level via
//! [`Secret`] rather than papered over with a misleading rename here,
//! because the column names are part of the live schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BackendError, BackendResult, WalletBackend};
use crate::identity::WalletIdentity;
use crate::keys::Secret;
use crate::ledger::BalanceEntry;

// ---------------------------------------------------------------------------
// Transport error
// ---------------------------------------------------------------------------

/// The remote service was unreachable or rejected an operation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// A row of the `user_wallets` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletRow {
    pub id: String,
    pub user_id: String,
    pub public_key: String,
    pub private_key_encrypted: Secret,
    pub mnemonic_encrypted: Option<Secret>,
    pub created_at: DateTime<Utc>,
}

/// A row of the `wallet_balances` table. Unique per `(user_id, token_symbol)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub user_id: String,
    pub token_symbol: String,
    pub token_name: String,
    pub balance: f64,
    pub usd_value: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&WalletIdentity> for WalletRow {
    fn from(identity: &WalletIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            user_id: identity.owner_id.clone(),
            public_key: identity.public_key.clone(),
            private_key_encrypted: identity.private_key.clone(),
            mnemonic_encrypted: identity.mnemonic.clone(),
            created_at: identity.created_at,
        }
    }
}

impl From<WalletRow> for WalletIdentity {
    fn from(row: WalletRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.user_id,
            public_key: row.public_key,
            private_key: row.private_key_encrypted,
            mnemonic: row.mnemonic_encrypted,
            created_at: row.created_at,
        }
    }
}

impl From<&BalanceEntry> for BalanceRow {
    fn from(entry: &BalanceEntry) -> Self {
        Self {
            user_id: entry.owner_id.clone(),
            token_symbol: entry.token_symbol.clone(),
            token_name: entry.token_name.clone(),
            balance: entry.balance,
            usd_value: entry.usd_value,
            updated_at: entry.updated_at,
        }
    }
}

impl From<BalanceRow> for BalanceEntry {
    fn from(row: BalanceRow) -> Self {
        Self {
            owner_id: row.user_id,
            token_symbol: row.token_symbol,
            token_name: row.token_name,
            balance: row.balance,
            usd_value: row.usd_value,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// RemoteClient
// ---------------------------------------------------------------------------

/// The external remote-data collaborator: table operations keyed by owner
/// id and token symbol.
///
/// Implementations wrap whatever hosted service the deployment uses; tests
/// use [`super::MemoryRemote`]. `insert_wallet` replaces any existing row
/// for the same `user_id` (one wallet per owner, always). `upsert_balances`
/// replaces rows by `(user_id, token_symbol)` and inserts the rest.
pub trait RemoteClient {
    fn select_wallet(&self, user_id: &str) -> Result<Option<WalletRow>, TransportError>;
    fn insert_wallet(&mut self, row: &WalletRow) -> Result<(), TransportError>;
    fn select_balances(&self, user_id: &str) -> Result<Vec<BalanceRow>, TransportError>;
    fn upsert_balances(&mut self, rows: &[BalanceRow]) -> Result<(), TransportError>;
    fn delete_wallet(&mut self, user_id: &str) -> Result<(), TransportError>;
}

impl<C: RemoteClient + ?Sized> RemoteClient for &mut C {
    fn select_wallet(&self, user_id: &str) -> Result<Option<WalletRow>, TransportError> {
        (**self).select_wallet(user_id)
    }

    fn insert_wallet(&mut self, row: &WalletRow) -> Result<(), TransportError> {
        (**self).insert_wallet(row)
    }

    fn select_balances(&self, user_id: &str) -> Result<Vec<BalanceRow>, TransportError> {
        (**self).select_balances(user_id)
    }

    fn upsert_balances(&mut self, rows: &[BalanceRow]) -> Result<(), TransportError> {
        (**self).upsert_balances(rows)
    }

    fn delete_wallet(&mut self, user_id: &str) -> Result<(), TransportError> {
        (**self).delete_wallet(user_id)
    }
}

/// The always-absent remote client for local-only deployments (the CLI,
/// offline builds). Every call fails as a transport error, which the
/// store's resolution logic turns into local mode. In practice the store
/// never calls it: local-only stores are constructed without a remote.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemote;

impl RemoteClient for NoRemote {
    fn select_wallet(&self, _user_id: &str) -> Result<Option<WalletRow>, TransportError> {
        Err(TransportError::new("no remote service configured"))
    }

    fn insert_wallet(&mut self, _row: &WalletRow) -> Result<(), TransportError> {
        Err(TransportError::new("no remote service configured"))
    }

    fn select_balances(&self, _user_id: &str) -> Result<Vec<BalanceRow>, TransportError> {
        Err(TransportError::new("no remote service configured"))
    }

    fn upsert_balances(&mut self, _rows: &[BalanceRow]) -> Result<(), TransportError> {
        Err(TransportError::new("no remote service configured"))
    }

    fn delete_wallet(&mut self, _user_id: &str) -> Result<(), TransportError> {
        Err(TransportError::new("no remote service configured"))
    }
}

// ---------------------------------------------------------------------------
// RemoteBackend
// ---------------------------------------------------------------------------

/// [`WalletBackend`] over a [`RemoteClient`].
///
/// Pure adaptation: row shapes to domain shapes, `Ok(None)` to
/// [`BackendError::NotFound`], [`TransportError`] to
/// [`BackendError::Transport`]. No retries, no caching -- policy lives in
/// the store and the ledger.
pub struct RemoteBackend<C: RemoteClient> {
    client: C,
}

impl<C: RemoteClient> RemoteBackend<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Direct access to the collaborator. Mainly for tests that need to
    /// inject failures or inspect rows.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C: RemoteClient> WalletBackend for RemoteBackend<C> {
    fn get_identity(&self, owner_id: &str) -> BackendResult<WalletIdentity> {
        let row = self
            .client
            .select_wallet(owner_id)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        row.map(WalletIdentity::from).ok_or(BackendError::NotFound)
    }

    fn put_identity(&mut self, identity: &WalletIdentity) -> BackendResult<()> {
        self.client
            .insert_wallet(&WalletRow::from(identity))
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    fn get_balances(&self, owner_id: &str) -> BackendResult<Vec<BalanceEntry>> {
        let rows = self
            .client
            .select_balances(owner_id)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(rows.into_iter().map(BalanceEntry::from).collect())
    }

    fn put_balances(&mut self, _owner_id: &str, entries: &[BalanceEntry]) -> BackendResult<()> {
        let rows: Vec<BalanceRow> = entries.iter().map(BalanceRow::from).collect();
        self.client
            .upsert_balances(&rows)
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    fn clear(&mut self, owner_id: &str) -> BackendResult<()> {
        self.client
            .delete_wallet(owner_id)
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::ledger::demo_entries;
    use crate::persist::MemoryRemote;

    #[test]
    fn missing_wallet_maps_to_not_found() {
        let backend = RemoteBackend::new(MemoryRemote::new());
        let result = backend.get_identity("user-1");
        assert!(matches!(result, Err(BackendError::NotFound)));
    }

    #[test]
    fn transport_failure_maps_to_transport() {
        let mut backend = RemoteBackend::new(MemoryRemote::new());
        backend.client_mut().set_failing(true);
        let result = backend.get_identity("user-1");
        assert!(matches!(result, Err(BackendError::Transport(_))));
    }

    #[test]
    fn identity_roundtrip_preserves_fields() {
        let mut backend = RemoteBackend::new(MemoryRemote::new());
        let identity = WalletIdentity::for_owner("user-1", keys::generate());

        backend.put_identity(&identity).unwrap();
        let loaded = backend.get_identity("user-1").unwrap();
        assert_eq!(loaded, identity);
    }

    #[test]
    fn balances_scoped_by_owner() {
        let mut backend = RemoteBackend::new(MemoryRemote::new());
        backend
            .put_balances("user-1", &demo_entries("user-1"))
            .unwrap();

        assert_eq!(backend.get_balances("user-1").unwrap().len(), 3);
        // Another owner sees nothing, not an error.
        assert!(backend.get_balances("user-2").unwrap().is_empty());
    }

    #[test]
    fn clear_removes_wallet_and_balances() {
        let mut backend = RemoteBackend::new(MemoryRemote::new());
        let identity = WalletIdentity::for_owner("user-1", keys::generate());
        backend.put_identity(&identity).unwrap();
        backend
            .put_balances("user-1", &demo_entries("user-1"))
            .unwrap();

        backend.clear("user-1").unwrap();
        assert!(matches!(
            backend.get_identity("user-1"),
            Err(BackendError::NotFound)
        ));
        assert!(backend.get_balances("user-1").unwrap().is_empty());
    }

    #[test]
    fn no_remote_always_fails_transport() {
        let mut client = NoRemote;
        assert!(client.select_wallet("user-1").is_err());
        assert!(client.delete_wallet("user-1").is_err());
    }
}
