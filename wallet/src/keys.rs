//! # Key Generation
//!
//! Keypair and mnemonic derivation for Wegram wallets. This module is pure:
//! it derives key material and hands it back as strings, nothing more.
//! Persistence is the store's job, display is the UI's job.
//!
//! ## Key format
//!
//! Wegram wallets are Solana-compatible:
//!
//! - Public key: base58 of the 32-byte Ed25519 verifying key.
//! - Private key: base58 of the 64-byte `secret || public` keypair, the
//!   format Phantom and friends import and export.
//! - Mnemonic: 12 English BIP-39 words. The keypair is derived from the
//!   mnemonic seed, so the phrase alone recovers the whole wallet.
//!
//! ## Failure model
//!
//! The import functions return `Option` rather than a detailed error.
//! Callers show one uniform "invalid input" message regardless of whether
//! the base58 was garbage, the length was off, or the checksum of the
//! embedded public key failed. Being specific about *why* an import failed
//! mostly helps attackers probing pasted key material.
//!
//! Key bytes are never logged. If you add logging to this module, you will
//! be asked to leave.

use bip39::{Language, Mnemonic};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BIP-39 entropy size in bytes. 16 bytes gives a 12-word phrase, which is
/// what the rest of the Solana ecosystem defaults to.
const MNEMONIC_ENTROPY_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A string that must not leak through logs or debug output.
///
/// Wallet secrets (private keys, mnemonics) are stored unencrypted in this
/// design. That is a known gap, not an accident. Wrapping them in `Secret`
/// keeps the sensitive fields explicit in the data model so field-level
/// encryption can be added later without touching any call sites, and it
/// makes an accidental `{:?}` harmless in the meantime.
///
/// Serialization is transparent: a `Secret` round-trips as a plain JSON
/// string, which the persisted record shapes require.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a sensitive string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the inner value. The name is deliberately loud so that
    /// every access to raw secret material is greppable.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the value. Not even "partially" -- a partial leak is
        // still a leak.
        write!(f, "Secret([redacted])")
    }
}

// ---------------------------------------------------------------------------
// WalletKeys
// ---------------------------------------------------------------------------

/// Freshly derived key material, not yet attached to any owner.
///
/// This is what [`generate`] and the import functions produce. The store
/// turns it into a persisted [`WalletIdentity`](crate::identity::WalletIdentity)
/// by attaching an owner id and a creation timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletKeys {
    /// Base58-encoded 32-byte public key. Safe to share, display, log.
    pub public_key: String,

    /// Base58-encoded 64-byte keypair (`secret || public`).
    pub private_key: Secret,

    /// 12-word recovery phrase. Present for generated wallets; absent for
    /// wallets imported from a raw private key, where no phrase exists.
    pub mnemonic: Option<Secret>,
}

impl WalletKeys {
    fn from_signing_key(signing_key: &SigningKey, mnemonic: Option<String>) -> Self {
        let public = signing_key.verifying_key().to_bytes();
        let mut keypair = [0u8; 64];
        keypair[..32].copy_from_slice(&signing_key.to_bytes());
        keypair[32..].copy_from_slice(&public);

        Self {
            public_key: bs58::encode(public).into_string(),
            private_key: Secret::new(bs58::encode(keypair).into_string()),
            mnemonic: mnemonic.map(Secret::new),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation & Import
// ---------------------------------------------------------------------------

/// Generates a fresh wallet: new mnemonic, keypair derived from its seed.
///
/// Entropy comes from the OS CSPRNG. The keypair is a deterministic
/// function of the mnemonic, so backing up the 12 words backs up
/// everything.
pub fn generate() -> WalletKeys {
    let mut entropy = [0u8; MNEMONIC_ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);

    // 16 bytes is a valid BIP-39 entropy length, so this cannot fail.
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .expect("16-byte entropy is a valid BIP-39 length");

    derive_from_mnemonic(&mnemonic)
}

/// Rebuilds wallet keys from a base58 private key string.
///
/// Accepts the 64-byte `secret || public` form and the bare 32-byte seed.
/// For the 64-byte form the embedded public key must match the one derived
/// from the secret half; a mismatch means the input was corrupted or
/// hand-assembled, and we refuse it.
///
/// Returns `None` on any validation failure. No recovery phrase can be
/// reconstructed from a raw key, so `mnemonic` is always absent.
pub fn from_private_key(input: &str) -> Option<WalletKeys> {
    let bytes = bs58::decode(input.trim()).into_vec().ok()?;

    let seed: [u8; 32] = match bytes.len() {
        64 => {
            let (secret, public) = bytes.split_at(32);
            let seed: [u8; 32] = secret.try_into().ok()?;
            let signing_key = SigningKey::from_bytes(&seed);
            if signing_key.verifying_key().to_bytes() != public {
                return None;
            }
            seed
        }
        32 => bytes.as_slice().try_into().ok()?,
        _ => return None,
    };

    let signing_key = SigningKey::from_bytes(&seed);
    Some(WalletKeys::from_signing_key(&signing_key, None))
}

/// Rebuilds wallet keys from a BIP-39 recovery phrase.
///
/// The phrase is normalized (whitespace, case) before validation, so a
/// phrase pasted with stray spaces still imports. Returns `None` if the
/// words or checksum are invalid.
pub fn from_mnemonic(phrase: &str) -> Option<WalletKeys> {
    let normalized = phrase.trim().to_lowercase();
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized).ok()?;
    Some(derive_from_mnemonic(&mnemonic))
}

/// Derives the Ed25519 keypair from a mnemonic's seed.
///
/// The first 32 bytes of the BIP-39 seed (empty passphrase) are used as
/// the Ed25519 secret scalar. Deterministic: same phrase, same keys.
fn derive_from_mnemonic(mnemonic: &Mnemonic) -> WalletKeys {
    let seed = mnemonic.to_seed("");
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&seed[..32]);

    let signing_key = SigningKey::from_bytes(&secret);
    WalletKeys::from_signing_key(&signing_key, Some(mnemonic.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_complete_keys() {
        let keys = generate();
        assert!(!keys.public_key.is_empty());
        assert!(!keys.private_key.expose().is_empty());

        let phrase = keys.mnemonic.as_ref().expect("generated wallets carry a phrase");
        assert_eq!(phrase.expose().split_whitespace().count(), 12);
    }

    #[test]
    fn generated_keys_are_unique() {
        let a = generate();
        let b = generate();
        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn private_key_roundtrip() {
        let original = generate();
        let imported = from_private_key(original.private_key.expose())
            .expect("own private key must import");
        assert_eq!(imported.public_key, original.public_key);
        // A raw key carries no phrase.
        assert!(imported.mnemonic.is_none());
    }

    #[test]
    fn mnemonic_roundtrip() {
        let original = generate();
        let phrase = original.mnemonic.as_ref().unwrap().expose().to_string();
        let imported = from_mnemonic(&phrase).expect("own phrase must import");
        assert_eq!(imported.public_key, original.public_key);
    }

    #[test]
    fn mnemonic_import_tolerates_whitespace_and_case() {
        let original = generate();
        let phrase = original.mnemonic.as_ref().unwrap().expose().to_string();
        let messy = format!("  {}  ", phrase.to_uppercase());
        let imported = from_mnemonic(&messy).expect("normalized phrase must import");
        assert_eq!(imported.public_key, original.public_key);
    }

    #[test]
    fn invalid_private_key_rejected() {
        assert!(from_private_key("not-a-key").is_none());
        assert!(from_private_key("").is_none());
        // Valid base58, wrong length.
        assert!(from_private_key(&bs58::encode([7u8; 17]).into_string()).is_none());
    }

    #[test]
    fn tampered_keypair_rejected() {
        // Flip the embedded public half so it no longer matches the secret.
        let keys = generate();
        let mut bytes = bs58::decode(keys.private_key.expose()).into_vec().unwrap();
        bytes[40] ^= 0xFF;
        let tampered = bs58::encode(bytes).into_string();
        assert!(from_private_key(&tampered).is_none());
    }

    #[test]
    fn invalid_mnemonic_rejected() {
        assert!(from_mnemonic("definitely not twelve valid bip39 words").is_none());
        assert!(from_mnemonic("").is_none());
    }

    #[test]
    fn bare_seed_import_accepted() {
        let keys = generate();
        let full = bs58::decode(keys.private_key.expose()).into_vec().unwrap();
        let seed_only = bs58::encode(&full[..32]).into_string();
        let imported = from_private_key(&seed_only).expect("32-byte seed must import");
        assert_eq!(imported.public_key, keys.public_key);
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("super-secret-material");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-material"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn secret_serializes_as_plain_string() {
        let secret = Secret::new("value");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"value\"");
        let back: Secret = serde_json::from_str("\"value\"").unwrap();
        assert_eq!(back, secret);
    }
}
