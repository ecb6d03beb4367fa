//! # Wallet Store
//!
//! The resolution state machine that owns the active wallet for a session.
//! Given a [`Session`], the store decides remote vs. local mode, finds or
//! creates the wallet record, seeds or loads balances, and then exposes
//! the whole surface the UI binds to: identity, balance rows, portfolio
//! total, and the mutation operations.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized
//!     |  resolve(session)          session.loading -> held, no transition
//!     v
//! Resolving                        re-entrant resolve() is ignored
//!     |-- authenticated: remote lookup
//!     |       found        -> Ready(Remote)
//!     |       not found    -> create + seed  -> Ready(Remote)
//!     |       failure      -> local path     -> Ready(Local)
//!     `-- anonymous: local lookup
//!             found        -> Ready(Local)
//!             missing/bad  -> regenerate     -> Ready(Local)
//! Ready(mode)                      terminal until reset()
//! ```
//!
//! ## Failure policy
//!
//! Resolution never surfaces an error: any remote failure degrades to
//! local mode, and any unreadable local record is discarded and
//! regenerated. Durability is sacrificed for availability, deliberately.
//! The session always ends Ready with some wallet. Only explicit user
//! actions (import, reset) report pass/fail.
//!
//! The store is single-threaded by design; resolution and mutations run
//! to completion on the caller's thread. The re-entrancy guard exists so
//! that a second resolution trigger arriving mid-flight (from a nested
//! callback) cannot start a duplicate creation.

use thiserror::Error;

use crate::config;
use crate::identity::WalletIdentity;
use crate::keys::{self, WalletKeys};
use crate::ledger::{BalanceEntry, Ledger, LedgerError};
use crate::persist::{
    BackendError, KeyValueStore, LocalBackend, NoRemote, RemoteBackend, RemoteClient,
    WalletBackend,
};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Errors & states
// ---------------------------------------------------------------------------

/// Errors surfaced by explicit, user-initiated store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The pasted key or phrase failed validation. Nothing was changed.
    #[error("invalid key or recovery phrase")]
    InvalidImport,

    /// The store has not resolved a wallet yet.
    #[error("wallet store is not ready")]
    NotReady,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Which persistence backend the resolved wallet lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendMode {
    /// Remote table rows scoped to the authenticated owner.
    Remote,
    /// Local key-value storage under the demo keys.
    Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoreState {
    Uninitialized,
    Resolving,
    Ready(BackendMode),
}

/// Outcome of a [`WalletStore::resolve`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The auth layer is still loading; nothing was attempted.
    Held,
    /// Another resolution is already in flight; this trigger was ignored.
    InFlight,
    /// The store is Ready on the given backend.
    Ready(BackendMode),
}

// ---------------------------------------------------------------------------
// WalletStore
// ---------------------------------------------------------------------------

/// Owns the single active wallet for the current session.
///
/// Construct once with both collaborators, then call [`resolve`] whenever
/// the session changes. External consumers only read snapshots and invoke
/// the mutation operations; they never touch records directly.
///
/// [`resolve`]: Self::resolve
pub struct WalletStore<C: RemoteClient, K: KeyValueStore> {
    remote: Option<RemoteBackend<C>>,
    local: LocalBackend<K>,
    state: StoreState,
    identity: Option<WalletIdentity>,
    ledger: Ledger,
}

/// A store with no remote collaborator at all; resolution always lands in
/// local mode. What the CLI and offline builds use.
pub type LocalWalletStore<K> = WalletStore<NoRemote, K>;

impl<K: KeyValueStore> LocalWalletStore<K> {
    /// Builds a local-only store over a key-value collaborator.
    pub fn local_only(kv: K) -> Self {
        Self::new(None, kv)
    }
}

impl<C: RemoteClient, K: KeyValueStore> WalletStore<C, K> {
    /// Builds a store over the two persistence collaborators. Pass `None`
    /// for `remote` in deployments without a hosted backend.
    pub fn new(remote: Option<C>, kv: K) -> Self {
        Self {
            remote: remote.map(RemoteBackend::new),
            local: LocalBackend::new(kv),
            state: StoreState::Uninitialized,
            identity: None,
            ledger: Ledger::new(config::DEMO_OWNER),
        }
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// The resolved wallet record, once Ready.
    pub fn identity(&self) -> Option<&WalletIdentity> {
        self.identity.as_ref()
    }

    /// Current balance rows. Empty until Ready, and possibly empty after
    /// if balance fetching failed -- the UI must tolerate that.
    pub fn balances(&self) -> &[BalanceEntry] {
        self.ledger.entries()
    }

    /// The derived portfolio total in USD.
    pub fn total_usd_value(&self) -> f64 {
        self.ledger.total_usd()
    }

    /// `true` until resolution has completed.
    pub fn is_loading(&self) -> bool {
        !matches!(self.state, StoreState::Ready(_))
    }

    /// The active backend mode, once Ready.
    pub fn mode(&self) -> Option<BackendMode> {
        match self.state {
            StoreState::Ready(mode) => Some(mode),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolves the wallet for the given session.
    ///
    /// Idempotent for an unchanged owner: calling again once Ready returns
    /// the existing wallet without touching storage. A changed owner
    /// re-resolves from scratch. A call while a resolution is in flight is
    /// ignored (re-entrancy guard), so duplicate wallet creation is
    /// impossible even if triggers arrive from nested callbacks.
    pub fn resolve(&mut self, session: &Session) -> Resolution {
        if session.loading {
            tracing::debug!("auth still loading; holding wallet resolution");
            return Resolution::Held;
        }
        if matches!(self.state, StoreState::Resolving) {
            tracing::debug!("wallet resolution already in flight; ignoring trigger");
            return Resolution::InFlight;
        }
        if let StoreState::Ready(mode) = self.state {
            let same_owner = self
                .identity
                .as_ref()
                .is_some_and(|identity| identity.owner_id == session.owner_or_demo());
            if same_owner {
                return Resolution::Ready(mode);
            }
        }

        self.state = StoreState::Resolving;

        let mode = match (&session.owner_id, self.remote.is_some()) {
            (Some(owner), true) => {
                let owner = owner.clone();
                match self.resolve_remote(&owner) {
                    Ok(()) => BackendMode::Remote,
                    Err(err) => {
                        tracing::warn!(%err, %owner, "remote wallet resolution failed; degrading to local mode");
                        self.resolve_local();
                        BackendMode::Local
                    }
                }
            }
            _ => {
                self.resolve_local();
                BackendMode::Local
            }
        };

        self.state = StoreState::Ready(mode);
        Resolution::Ready(mode)
    }

    /// Remote path: find or create the owner's wallet row, then load
    /// balances. Any error here sends the caller down the local path.
    fn resolve_remote(&mut self, owner: &str) -> Result<(), BackendError> {
        let Some(backend) = self.remote.as_mut() else {
            return Err(BackendError::Transport("no remote client".into()));
        };

        let (identity, created) = match backend.get_identity(owner) {
            Ok(identity) => {
                tracing::debug!(owner, "found existing remote wallet");
                (identity, false)
            }
            Err(BackendError::NotFound) => {
                let identity = WalletIdentity::for_owner(owner, keys::generate());
                // Persist before exposing: a Ready wallet always has a
                // stored record behind it.
                backend.put_identity(&identity)?;
                tracing::info!(owner, "created remote wallet");
                (identity, true)
            }
            Err(err) => return Err(err),
        };

        let mut ledger = Ledger::new(owner);
        if created {
            if let Err(err) = ledger.seed_initial(backend) {
                // Seeding is best-effort; the UI tolerates an empty list.
                tracing::warn!(%err, owner, "failed to seed initial balances");
            }
        }
        if let Err(err) = ledger.fetch(backend) {
            tracing::warn!(%err, owner, "failed to fetch balances; showing empty list");
        }

        self.identity = Some(identity);
        self.ledger = ledger;
        Ok(())
    }

    /// Local path: load the demo wallet, regenerating anything missing or
    /// unreadable. This path cannot fail; at worst the wallet lives only
    /// in memory for this session.
    fn resolve_local(&mut self) {
        let backend = &mut self.local;

        let identity = match backend.get_identity(config::DEMO_OWNER) {
            Ok(identity) => identity,
            Err(err) => {
                if !matches!(err, BackendError::NotFound) {
                    tracing::warn!(%err, "discarding unreadable local wallet");
                }
                let identity = WalletIdentity::demo(keys::generate());
                if let Err(err) = backend.put_identity(&identity) {
                    tracing::warn!(%err, "failed to persist demo wallet; continuing in memory");
                }
                identity
            }
        };

        let mut ledger = Ledger::new(config::DEMO_OWNER);
        if let Err(err) = ledger.fetch(backend) {
            if !matches!(err, LedgerError::Backend(BackendError::NotFound)) {
                tracing::warn!(%err, "discarding unreadable local balances");
            }
            if let Err(err) = ledger.seed_demo(backend) {
                tracing::warn!(%err, "failed to seed demo balances");
            }
        }

        self.identity = Some(identity);
        self.ledger = ledger;
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Upserts a token's balance and USD value. Errors are returned; the
    /// snapshot is untouched on failure.
    pub fn try_update_balance(
        &mut self,
        symbol: &str,
        new_balance: f64,
        new_usd_value: f64,
    ) -> Result<(), StoreError> {
        let (ledger, backend) = self.parts().ok_or(StoreError::NotReady)?;
        ledger.update_balance(backend, symbol, new_balance, new_usd_value)?;
        Ok(())
    }

    /// UI-facing wrapper around [`try_update_balance`]: failures are
    /// logged and swallowed, preserving the last known good state.
    ///
    /// [`try_update_balance`]: Self::try_update_balance
    pub fn update_balance(&mut self, symbol: &str, new_balance: f64, new_usd_value: f64) {
        if let Err(err) = self.try_update_balance(symbol, new_balance, new_usd_value) {
            tracing::warn!(%err, symbol, "balance update failed; keeping last known state");
        }
    }

    /// Credits a reward on the given token. No-op for tokens the wallet
    /// does not hold.
    pub fn try_add_reward(&mut self, amount: f64, symbol: &str) -> Result<(), StoreError> {
        let (ledger, backend) = self.parts().ok_or(StoreError::NotReady)?;
        ledger.add_reward(backend, amount, symbol)?;
        Ok(())
    }

    /// UI-facing wrapper around [`try_add_reward`] for the base reward
    /// token. Engagement flows call this fire-and-forget.
    ///
    /// [`try_add_reward`]: Self::try_add_reward
    pub fn add_reward(&mut self, amount: f64) {
        self.add_reward_for(amount, config::REWARD_TOKEN_SYMBOL);
    }

    /// UI-facing wrapper around [`try_add_reward`] for an explicit token.
    ///
    /// [`try_add_reward`]: Self::try_add_reward
    pub fn add_reward_for(&mut self, amount: f64, symbol: &str) {
        if let Err(err) = self.try_add_reward(amount, symbol) {
            tracing::warn!(%err, symbol, "reward credit failed; keeping last known state");
        }
    }

    /// Reloads balances from the active backend. In local mode a missing
    /// or unreadable balance set is reseeded with demo data; failures
    /// otherwise keep the last known snapshot.
    pub fn refetch(&mut self) {
        let mode = match self.state {
            StoreState::Ready(mode) => mode,
            _ => {
                tracing::debug!("refetch before ready; ignoring");
                return;
            }
        };
        let Some((ledger, backend)) = self.parts() else {
            return;
        };

        if let Err(err) = ledger.fetch(backend) {
            match (mode, &err) {
                (
                    BackendMode::Local,
                    LedgerError::Backend(BackendError::NotFound | BackendError::Malformed(_)),
                ) => {
                    tracing::warn!(%err, "local balances unreadable; reseeding demo data");
                    if let Err(err) = ledger.seed_demo(backend) {
                        tracing::warn!(%err, "failed to reseed demo balances");
                    }
                }
                _ => tracing::warn!(%err, "balance refetch failed; keeping last known state"),
            }
        }
    }

    /// Clears the wallet: persisted record, balance set, and in-memory
    /// state. The store returns to Uninitialized and the next [`resolve`]
    /// behaves as first-time creation. User-initiated, so failures are
    /// surfaced.
    ///
    /// [`resolve`]: Self::resolve
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let owner = self
            .identity
            .as_ref()
            .ok_or(StoreError::NotReady)?
            .owner_id
            .clone();
        let (ledger, backend) = self.parts().ok_or(StoreError::NotReady)?;

        backend.clear(&owner)?;
        ledger.clear();
        self.identity = None;
        self.state = StoreState::Uninitialized;
        tracing::info!(%owner, "wallet reset");
        Ok(())
    }

    /// Replaces the active wallet's keys with ones imported from a base58
    /// private key. Invalid input is rejected without touching any state.
    pub fn import_private_key(&mut self, input: &str) -> Result<(), StoreError> {
        let keys = keys::from_private_key(input).ok_or(StoreError::InvalidImport)?;
        self.adopt_keys(keys)
    }

    /// Replaces the active wallet's keys with ones recovered from a BIP-39
    /// phrase. Invalid input is rejected without touching any state.
    pub fn import_mnemonic(&mut self, phrase: &str) -> Result<(), StoreError> {
        let keys = keys::from_mnemonic(phrase).ok_or(StoreError::InvalidImport)?;
        self.adopt_keys(keys)
    }

    fn adopt_keys(&mut self, keys: WalletKeys) -> Result<(), StoreError> {
        let owner = self
            .identity
            .as_ref()
            .ok_or(StoreError::NotReady)?
            .owner_id
            .clone();
        let identity = if owner == config::DEMO_OWNER {
            WalletIdentity::demo(keys)
        } else {
            WalletIdentity::for_owner(&owner, keys)
        };

        let (_ledger, backend) = self.parts().ok_or(StoreError::NotReady)?;
        backend.put_identity(&identity)?;
        self.identity = Some(identity);
        tracing::info!(%owner, "wallet keys replaced by import");
        Ok(())
    }

    /// Splits the store into the ledger and the active backend. `None`
    /// until Ready. Written as one function so the borrow checker can see
    /// the two halves are disjoint.
    fn parts(&mut self) -> Option<(&mut Ledger, &mut dyn WalletBackend)> {
        match self.state {
            StoreState::Ready(BackendMode::Remote) => {
                let backend = self.remote.as_mut()?;
                Some((&mut self.ledger, backend as &mut dyn WalletBackend))
            }
            StoreState::Ready(BackendMode::Local) => {
                Some((&mut self.ledger, &mut self.local as &mut dyn WalletBackend))
            }
            _ => None,
        }
    }

    /// Test access to the remote collaborator.
    #[doc(hidden)]
    pub fn remote_client_mut(&mut self) -> Option<&mut C> {
        self.remote.as_mut().map(RemoteBackend::client_mut)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryKv, MemoryRemote};

    fn remote_store() -> WalletStore<MemoryRemote, MemoryKv> {
        WalletStore::new(Some(MemoryRemote::new()), MemoryKv::new())
    }

    #[test]
    fn loading_session_holds_resolution() {
        let mut store = remote_store();
        assert_eq!(store.resolve(&Session::loading()), Resolution::Held);
        assert!(store.is_loading());
        assert!(store.identity().is_none());
    }

    #[test]
    fn anonymous_session_resolves_local() {
        let mut store = remote_store();
        let outcome = store.resolve(&Session::anonymous());
        assert_eq!(outcome, Resolution::Ready(BackendMode::Local));
        assert!(!store.is_loading());
        assert!(store.identity().unwrap().is_demo());
        // Fresh demo wallets start with the showcase balances.
        assert_eq!(store.balances().len(), 3);
        assert!(store.total_usd_value() > 0.0);
    }

    #[test]
    fn authenticated_session_resolves_remote() {
        let mut store = remote_store();
        let outcome = store.resolve(&Session::authenticated("user-1"));
        assert_eq!(outcome, Resolution::Ready(BackendMode::Remote));
        let identity = store.identity().unwrap();
        assert_eq!(identity.owner_id, "user-1");
        assert!(!identity.is_demo());
    }

    #[test]
    fn no_remote_client_means_local_even_when_authenticated() {
        let mut store: LocalWalletStore<MemoryKv> = WalletStore::local_only(MemoryKv::new());
        let outcome = store.resolve(&Session::authenticated("user-1"));
        assert_eq!(outcome, Resolution::Ready(BackendMode::Local));
    }

    #[test]
    fn resolve_is_idempotent_for_same_owner() {
        let mut store = remote_store();
        let session = Session::authenticated("user-1");
        store.resolve(&session);
        let key = store.identity().unwrap().public_key.clone();

        store.resolve(&session);
        assert_eq!(store.identity().unwrap().public_key, key);
        assert_eq!(store.remote_client_mut().unwrap().wallet_count(), 1);
    }

    #[test]
    fn owner_change_re_resolves() {
        let mut store = remote_store();
        store.resolve(&Session::authenticated("user-1"));
        let first = store.identity().unwrap().public_key.clone();

        store.resolve(&Session::authenticated("user-2"));
        let second = store.identity().unwrap().public_key.clone();
        assert_ne!(first, second);
        assert_eq!(store.identity().unwrap().owner_id, "user-2");
    }

    #[test]
    fn mutations_before_ready_are_not_ready_errors() {
        let mut store = remote_store();
        assert!(matches!(
            store.try_add_reward(1.0, "WGR"),
            Err(StoreError::NotReady)
        ));
        assert!(matches!(store.reset(), Err(StoreError::NotReady)));
        // And the logging wrappers just swallow it.
        store.add_reward(1.0);
        store.update_balance("WGR", 1.0, 0.5);
        store.refetch();
    }

    #[test]
    fn invalid_import_is_rejected_without_state_change() {
        let mut store = remote_store();
        store.resolve(&Session::anonymous());
        let before = store.identity().unwrap().clone();

        assert!(matches!(
            store.import_private_key("not-a-key"),
            Err(StoreError::InvalidImport)
        ));
        assert!(matches!(
            store.import_mnemonic("twelve bogus words that are not a phrase at all ok"),
            Err(StoreError::InvalidImport)
        ));
        assert_eq!(store.identity().unwrap(), &before);
    }

    #[test]
    fn valid_import_replaces_keys_and_persists() {
        let mut store = remote_store();
        store.resolve(&Session::anonymous());

        let donor = keys::generate();
        store
            .import_private_key(donor.private_key.expose())
            .unwrap();
        assert_eq!(store.identity().unwrap().public_key, donor.public_key);

        // The imported keys survive a fresh resolution.
        let mut reread = WalletStore::<MemoryRemote, _>::new(
            None,
            store.local.store().clone(),
        );
        reread.resolve(&Session::anonymous());
        assert_eq!(reread.identity().unwrap().public_key, donor.public_key);
    }
}
