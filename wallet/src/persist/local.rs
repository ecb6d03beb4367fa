//! # Local Backend
//!
//! Wallet persistence for anonymous sessions: JSON blobs under two fixed
//! keys in a string key-value store. This is also the landing spot when
//! remote resolution fails, so it has to be forgiving -- malformed stored
//! content is reported as [`BackendError::Malformed`] and the caller
//! discards and regenerates instead of crashing.
//!
//! ## Stored shapes
//!
//! | Key                     | Value                                        |
//! |-------------------------|----------------------------------------------|
//! | `wegram_demo_wallet`    | `{publicKey, privateKey, mnemonic?}`         |
//! | `wegram_demo_balances`  | `[{tokenSymbol, tokenName, balance, usdValue, updatedAt}, ..]` |
//!
//! Both shapes predate this crate; they must round-trip exactly so that
//! existing installs keep their demo wallet across upgrades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{BackendError, BackendResult, WalletBackend};
use crate::config;
use crate::identity::{StoredKeys, WalletIdentity};
use crate::ledger::BalanceEntry;

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// The external local-storage collaborator: string values under fixed keys.
///
/// In the browser client this was `localStorage`; here it is sled on disk
/// ([`SledStore`]) or a hash map in tests ([`super::MemoryKv`]).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> BackendResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> BackendResult<()>;
    fn remove(&mut self, key: &str) -> BackendResult<()>;
}

/// Key-value storage on sled.
///
/// One flat keyspace in the default tree; values are UTF-8 JSON. Writes
/// are flushed immediately -- wallet mutations are low-volume and losing
/// one to a crash would cost the user a reward credit.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens or creates a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let db = sled::open(path).map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self { db })
    }

    /// Creates a temporary store that is cleaned up on drop. For tests.
    pub fn open_temporary() -> BackendResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let value = self
            .db
            .get(key)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| BackendError::Malformed(e.to_string()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> BackendResult<()> {
        self.db
            .insert(key, value.as_bytes())
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> BackendResult<()> {
        self.db
            .remove(key)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stored balance shape
// ---------------------------------------------------------------------------

/// The persisted balance row shape: camelCase, no owner field. Local
/// balances always belong to the demo owner.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBalance {
    token_symbol: String,
    token_name: String,
    balance: f64,
    usd_value: f64,
    updated_at: DateTime<Utc>,
}

impl StoredBalance {
    fn from_entry(entry: &BalanceEntry) -> Self {
        Self {
            token_symbol: entry.token_symbol.clone(),
            token_name: entry.token_name.clone(),
            balance: entry.balance,
            usd_value: entry.usd_value,
            updated_at: entry.updated_at,
        }
    }

    fn into_entry(self, owner_id: &str) -> BalanceEntry {
        BalanceEntry {
            owner_id: owner_id.to_string(),
            token_symbol: self.token_symbol,
            token_name: self.token_name,
            balance: self.balance,
            usd_value: self.usd_value,
            updated_at: self.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// LocalBackend
// ---------------------------------------------------------------------------

/// [`WalletBackend`] over a [`KeyValueStore`].
///
/// The owner id passed to each operation is accepted for interface parity
/// with the remote backend, but local storage holds exactly one wallet:
/// whatever lives under the fixed keys. In practice that owner is always
/// [`config::DEMO_OWNER`].
pub struct LocalBackend<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> LocalBackend<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Direct access to the underlying store. Mainly for tests that need
    /// to inspect or corrupt raw stored content.
    pub fn store(&self) -> &K {
        &self.kv
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.kv
    }
}

impl<K: KeyValueStore> WalletBackend for LocalBackend<K> {
    fn get_identity(&self, _owner_id: &str) -> BackendResult<WalletIdentity> {
        let raw = self
            .kv
            .get(config::LOCAL_WALLET_KEY)?
            .ok_or(BackendError::NotFound)?;
        let stored: StoredKeys =
            serde_json::from_str(&raw).map_err(|e| BackendError::Malformed(e.to_string()))?;
        Ok(stored.into_demo_identity())
    }

    fn put_identity(&mut self, identity: &WalletIdentity) -> BackendResult<()> {
        let json = serde_json::to_string(&StoredKeys::from(identity))
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        self.kv.put(config::LOCAL_WALLET_KEY, &json)
    }

    fn get_balances(&self, owner_id: &str) -> BackendResult<Vec<BalanceEntry>> {
        let raw = self
            .kv
            .get(config::LOCAL_BALANCES_KEY)?
            .ok_or(BackendError::NotFound)?;
        let stored: Vec<StoredBalance> =
            serde_json::from_str(&raw).map_err(|e| BackendError::Malformed(e.to_string()))?;
        Ok(stored
            .into_iter()
            .map(|row| row.into_entry(owner_id))
            .collect())
    }

    fn put_balances(&mut self, _owner_id: &str, entries: &[BalanceEntry]) -> BackendResult<()> {
        let stored: Vec<StoredBalance> = entries.iter().map(StoredBalance::from_entry).collect();
        let json = serde_json::to_string(&stored)
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        self.kv.put(config::LOCAL_BALANCES_KEY, &json)
    }

    fn clear(&mut self, _owner_id: &str) -> BackendResult<()> {
        self.kv.remove(config::LOCAL_WALLET_KEY)?;
        self.kv.remove(config::LOCAL_BALANCES_KEY)
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
    use crate::persist::MemoryKv;

    #[test]
    fn identity_roundtrip() {
        let mut backend = LocalBackend::new(MemoryKv::new());
        let identity = WalletIdentity::demo(keys::generate());

        backend.put_identity(&identity).unwrap();
        let loaded = backend.get_identity(config::DEMO_OWNER).unwrap();
        assert_eq!(loaded.public_key, identity.public_key);
        assert_eq!(loaded.private_key, identity.private_key);
        assert_eq!(loaded.mnemonic, identity.mnemonic);
    }

    #[test]
    fn missing_identity_is_not_found() {
        let backend = LocalBackend::new(MemoryKv::new());
        let result = backend.get_identity(config::DEMO_OWNER);
        assert!(matches!(result, Err(BackendError::NotFound)));
    }

    #[test]
    fn malformed_identity_is_reported_not_fatal() {
        let mut kv = MemoryKv::new();
        kv.put(config::LOCAL_WALLET_KEY, "{not valid json").unwrap();
        let backend = LocalBackend::new(kv);

        let result = backend.get_identity(config::DEMO_OWNER);
        assert!(matches!(result, Err(BackendError::Malformed(_))));
    }

    #[test]
    fn balances_roundtrip() {
        let mut backend = LocalBackend::new(MemoryKv::new());
        let entries = demo_entries(config::DEMO_OWNER);

        backend.put_balances(config::DEMO_OWNER, &entries).unwrap();
        let loaded = backend.get_balances(config::DEMO_OWNER).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn balances_persist_camel_case() {
        let mut backend = LocalBackend::new(MemoryKv::new());
        let entries = demo_entries(config::DEMO_OWNER);
        backend.put_balances(config::DEMO_OWNER, &entries).unwrap();

        let raw = backend
            .store()
            .get(config::LOCAL_BALANCES_KEY)
            .unwrap()
            .unwrap();
        assert!(raw.contains("\"tokenSymbol\""));
        assert!(raw.contains("\"usdValue\""));
        assert!(raw.contains("\"updatedAt\""));
        assert!(!raw.contains("owner"));
    }

    #[test]
    fn clear_removes_both_keys() {
        let mut backend = LocalBackend::new(MemoryKv::new());
        backend
            .put_identity(&WalletIdentity::demo(keys::generate()))
            .unwrap();
        backend
            .put_balances(config::DEMO_OWNER, &demo_entries(config::DEMO_OWNER))
            .unwrap();

        backend.clear(config::DEMO_OWNER).unwrap();
        assert!(matches!(
            backend.get_identity(config::DEMO_OWNER),
            Err(BackendError::NotFound)
        ));
        assert!(matches!(
            backend.get_balances(config::DEMO_OWNER),
            Err(BackendError::NotFound)
        ));
    }

    #[test]
    fn sled_store_roundtrip() {
        let mut store = SledStore::open_temporary().unwrap();
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn sled_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SledStore::open(dir.path()).unwrap();
            store.put("k", "persisted").unwrap();
        }
        let store = SledStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("persisted"));
    }
}
