//! # Persistence Adapter
//!
//! Dual-mode durability for the wallet subsystem. Two interchangeable
//! backends expose the same logical operations, so the store and the
//! ledger never know which one they are talking to:
//!
//! - [`remote::RemoteBackend`] -- relational table rows scoped by an owner
//!   foreign key, used when an authenticated identity exists.
//! - [`local::LocalBackend`] -- JSON blobs under fixed namespaced keys in a
//!   key-value store, used for anonymous sessions and as the fallback when
//!   the remote side misbehaves.
//!
//! The backend selected for a session is decided once, at resolution time,
//! by the wallet store. Nothing in this module makes that choice.
//!
//! ## Error taxonomy
//!
//! [`BackendError`] distinguishes the three outcomes callers react to
//! differently: a missing record (expected, triggers the creation path),
//! a transport failure (triggers fallback or log-and-ignore), and
//! malformed stored content (triggers discard-and-regenerate).

pub mod local;
pub mod memory;
pub mod remote;

use thiserror::Error;

use crate::identity::WalletIdentity;
use crate::ledger::BalanceEntry;

pub use local::{KeyValueStore, LocalBackend, SledStore};
pub use memory::{MemoryKv, MemoryRemote};
pub use remote::{BalanceRow, NoRemote, RemoteBackend, RemoteClient, TransportError, WalletRow};

/// Errors a persistence backend can produce.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No record exists for the requested owner. An expected outcome, not
    /// a failure: the caller creates the record and moves on.
    #[error("no record found for owner")]
    NotFound,

    /// The backend was unreachable or rejected the operation.
    #[error("backend transport error: {0}")]
    Transport(String),

    /// Stored content exists but does not parse. The caller should discard
    /// it and regenerate rather than crash.
    #[error("malformed stored data: {0}")]
    Malformed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The operations both backends expose.
///
/// `put_identity` is an upsert keyed by owner: writing an identity for an
/// owner that already has one replaces it. `put_balances` replaces the
/// owner's full balance set; rows are keyed by `(owner, token_symbol)` so
/// a rewrite can never produce duplicates. `get_balances` returns an empty
/// vector for an owner with a wallet but no rows; `NotFound` means the
/// balance set itself has never been written.
pub trait WalletBackend {
    /// Fetches the owner's wallet record.
    fn get_identity(&self, owner_id: &str) -> BackendResult<WalletIdentity>;

    /// Writes (or replaces) the owner's wallet record.
    fn put_identity(&mut self, identity: &WalletIdentity) -> BackendResult<()>;

    /// Fetches all balance rows for the owner.
    fn get_balances(&self, owner_id: &str) -> BackendResult<Vec<BalanceEntry>>;

    /// Replaces the owner's balance set.
    fn put_balances(&mut self, owner_id: &str, entries: &[BalanceEntry]) -> BackendResult<()>;

    /// Removes the owner's wallet record and balance set. Used by reset;
    /// the next resolution behaves as first-time creation.
    fn clear(&mut self, owner_id: &str) -> BackendResult<()>;
}
