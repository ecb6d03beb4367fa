// Copyright (c) 2026 Wegram Labs. MIT License.
// See LICENSE for details.

//! # Wegram Wallet Core Library
//!
//! The wallet subsystem of the Wegram client: key lifecycle, balance
//! bookkeeping, and dual-mode persistence. Every screen that shows a key,
//! a token balance, or a portfolio total reads from this crate; nothing
//! else in the app is allowed to touch wallet state directly.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the subsystem's actual
//! concerns:
//!
//! - **keys** -- Keypair and mnemonic generation. Pure derivation, no I/O.
//! - **identity** -- The single active wallet record and its persisted shape.
//! - **token** -- The fixed token set and the demo price table.
//! - **ledger** -- Per-owner balance rows and the derived portfolio total.
//! - **persist** -- Two interchangeable backends: remote tables when a user
//!   is signed in, local key-value storage otherwise.
//! - **store** -- The resolution state machine that ties it all together.
//! - **session** -- The session context handed in by the auth layer.
//! - **config** -- Storage keys, token prices, and the demo sentinel.
//!
//! ## Design Philosophy
//!
//! 1. The session always ends in a Ready state with *some* wallet. Remote
//!    failures degrade to local mode instead of surfacing errors.
//! 2. Mutations are `Result`-returning internally; only the UI-facing
//!    wrappers choose to log and discard.
//! 3. Secrets are wrapped in [`keys::Secret`] so they cannot leak through
//!    `Debug` output, and so encryption-at-rest can be added later without
//!    reshaping the data model.
//! 4. If it touches a balance, it has tests.

pub mod config;
pub mod identity;
pub mod keys;
pub mod ledger;
pub mod persist;
pub mod session;
pub mod store;
pub mod token;

pub use identity::{StoredKeys, WalletIdentity};
pub use keys::{Secret, WalletKeys};
pub use ledger::{BalanceEntry, Ledger, LedgerError};
pub use persist::{BackendError, BackendResult, WalletBackend};
pub use session::Session;
pub use store::{BackendMode, LocalWalletStore, Resolution, StoreError, WalletStore};
