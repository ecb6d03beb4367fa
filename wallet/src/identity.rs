//! # Wallet Identity
//!
//! The single active wallet record for an owner: keypair, optional recovery
//! phrase, timestamps. Exactly one [`WalletIdentity`] exists per owner at
//! any time. It is created lazily on first access and never deleted, only
//! reset and regenerated by explicit user action.
//!
//! Two shapes live here:
//!
//! - [`WalletIdentity`] -- the in-memory record the rest of the crate works
//!   with, owner-scoped and timestamped.
//! - [`StoredKeys`] -- the exact JSON shape persisted under the local
//!   wallet key: `{publicKey, privateKey, mnemonic?}`, camelCase, nothing
//!   else. Existing installs have data in this shape, so it must round-trip
//!   byte-for-byte in meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::keys::{Secret, WalletKeys};

/// The active wallet record for one owner.
///
/// Secrets are held as [`Secret`] so the derived `Debug` output is safe to
/// log. They are still plaintext at rest -- encryption before persistence
/// is a known gap in this design, isolated behind the `Secret` type so it
/// can be added without reshaping the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Row id: a UUID for remote-backed wallets, the demo sentinel locally.
    pub id: String,

    /// The owning identity, or [`config::DEMO_OWNER`] when anonymous.
    pub owner_id: String,

    /// Base58 public key. This is the address the UI shows.
    pub public_key: String,

    /// Base58 private key material. Unencrypted; see the type-level note.
    pub private_key: Secret,

    /// Recovery phrase, when one exists for this wallet.
    pub mnemonic: Option<Secret>,

    /// When this record was first created.
    pub created_at: DateTime<Utc>,
}

impl WalletIdentity {
    /// Builds a remote-backed identity for an authenticated owner.
    pub fn for_owner(owner_id: &str, keys: WalletKeys) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            public_key: keys.public_key,
            private_key: keys.private_key,
            mnemonic: keys.mnemonic,
            created_at: Utc::now(),
        }
    }

    /// Builds the local demo identity for an anonymous session.
    pub fn demo(keys: WalletKeys) -> Self {
        Self {
            id: config::DEMO_OWNER.to_string(),
            owner_id: config::DEMO_OWNER.to_string(),
            public_key: keys.public_key,
            private_key: keys.private_key,
            mnemonic: keys.mnemonic,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if this is the anonymous demo wallet.
    pub fn is_demo(&self) -> bool {
        self.owner_id == config::DEMO_OWNER
    }
}

// ---------------------------------------------------------------------------
// StoredKeys
// ---------------------------------------------------------------------------

/// The local persisted identity shape: `{publicKey, privateKey, mnemonic?}`.
///
/// Deliberately minimal. Owner and timestamps are not stored locally; a
/// local wallet is always the demo wallet and its `created_at` is the
/// moment it was loaded, matching the original client behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKeys {
    pub public_key: String,
    pub private_key: Secret,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<Secret>,
}

impl From<&WalletIdentity> for StoredKeys {
    fn from(identity: &WalletIdentity) -> Self {
        Self {
            public_key: identity.public_key.clone(),
            private_key: identity.private_key.clone(),
            mnemonic: identity.mnemonic.clone(),
        }
    }
}

impl StoredKeys {
    /// Rehydrates a demo [`WalletIdentity`] from the stored shape.
    pub fn into_demo_identity(self) -> WalletIdentity {
        WalletIdentity {
            id: config::DEMO_OWNER.to_string(),
            owner_id: config::DEMO_OWNER.to_string(),
            public_key: self.public_key,
            private_key: self.private_key,
            mnemonic: self.mnemonic,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn for_owner_assigns_uuid_and_owner() {
        let identity = WalletIdentity::for_owner("user-1", keys::generate());
        assert_eq!(identity.owner_id, "user-1");
        assert!(!identity.is_demo());
        // Row id is a real UUID, not the owner id.
        assert!(Uuid::parse_str(&identity.id).is_ok());
    }

    #[test]
    fn demo_identity_uses_sentinel() {
        let identity = WalletIdentity::demo(keys::generate());
        assert_eq!(identity.id, "demo");
        assert_eq!(identity.owner_id, "demo");
        assert!(identity.is_demo());
    }

    #[test]
    fn stored_keys_use_camel_case_field_names() {
        let identity = WalletIdentity::demo(keys::generate());
        let json = serde_json::to_string(&StoredKeys::from(&identity)).unwrap();
        assert!(json.contains("\"publicKey\""));
        assert!(json.contains("\"privateKey\""));
        assert!(json.contains("\"mnemonic\""));
    }

    #[test]
    fn stored_keys_omit_absent_mnemonic() {
        let mut identity = WalletIdentity::demo(keys::generate());
        identity.mnemonic = None;
        let json = serde_json::to_string(&StoredKeys::from(&identity)).unwrap();
        assert!(!json.contains("mnemonic"));
        // And a record without the field still parses.
        let back: StoredKeys = serde_json::from_str(&json).unwrap();
        assert!(back.mnemonic.is_none());
    }

    #[test]
    fn stored_keys_roundtrip() {
        let identity = WalletIdentity::demo(keys::generate());
        let stored = StoredKeys::from(&identity);
        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredKeys = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);

        let rehydrated = back.into_demo_identity();
        assert_eq!(rehydrated.public_key, identity.public_key);
        assert_eq!(rehydrated.private_key, identity.private_key);
        assert_eq!(rehydrated.mnemonic, identity.mnemonic);
    }
}
