//! # Wallet Constants
//!
//! Every magic value in the wallet subsystem lives here: storage key names,
//! the demo sentinel, and the fixed demo price table. If you find yourself
//! hardcoding one of these elsewhere, move it here first.
//!
//! The local storage key names are part of the persisted format. Existing
//! installs have data under them, so renaming one is a migration, not a
//! refactor.

/// Owner sentinel used when no authenticated user is present.
///
/// Anonymous sessions get a fully functional wallet scoped to this owner
/// and persisted in local storage only.
pub const DEMO_OWNER: &str = "demo";

/// Local storage key holding the demo wallet's key material as JSON
/// (`{publicKey, privateKey, mnemonic?}`).
pub const LOCAL_WALLET_KEY: &str = "wegram_demo_wallet";

/// Local storage key holding the demo balance rows as a JSON array.
pub const LOCAL_BALANCES_KEY: &str = "wegram_demo_balances";

/// The base reward token. Engagement rewards default to this symbol.
pub const REWARD_TOKEN_SYMBOL: &str = "WGR";

/// Fixed demo price for WGR in USD. There is no oracle in this subsystem;
/// USD values are bookkeeping derived from this table, not market data.
pub const WGR_PRICE_USD: f64 = 0.50;

/// Fallback price for every token without an explicit entry in the table.
pub const DEFAULT_TOKEN_PRICE_USD: f64 = 1.0;
