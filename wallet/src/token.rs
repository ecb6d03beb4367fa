//! # Token Set
//!
//! The fixed tokens a Wegram wallet tracks, and the demo price table used
//! to derive USD values. There is no token registry and no oracle here:
//! the set is three well-known tokens seeded at wallet creation, and
//! prices are constants.
//!
//! - **WGR** -- the Wegram reward token. Engagement rewards credit it.
//! - **SOL** -- the settlement-layer token the wallet keys belong to.
//! - **USDC** -- the stable token, pinned at $1.

use crate::config;

/// Static metadata for one token in the fixed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    /// Ticker symbol, unique per owner in the ledger.
    pub symbol: &'static str,
    /// Human-readable name shown in the balance list.
    pub name: &'static str,
}

/// The Wegram reward token.
pub const WEGRAM: TokenInfo = TokenInfo {
    symbol: "WGR",
    name: "Wegram",
};

/// The settlement-layer token.
pub const SOLANA: TokenInfo = TokenInfo {
    symbol: "SOL",
    name: "Solana",
};

/// The stable token.
pub const USD_COIN: TokenInfo = TokenInfo {
    symbol: "USDC",
    name: "USD Coin",
};

/// The full set seeded into every new wallet, in display order.
pub const SEED_TOKENS: [TokenInfo; 3] = [WEGRAM, SOLANA, USD_COIN];

/// Looks up the display name for a symbol from the fixed set.
pub fn name_for(symbol: &str) -> Option<&'static str> {
    SEED_TOKENS
        .iter()
        .find(|token| token.symbol == symbol)
        .map(|token| token.name)
}

/// Demo price for a token in USD.
///
/// WGR has an explicit price; every other symbol falls back to $1. Reward
/// credits use this to recompute a row's USD value from its new balance.
pub fn price_usd(symbol: &str) -> f64 {
    if symbol == WEGRAM.symbol {
        config::WGR_PRICE_USD
    } else {
        config::DEFAULT_TOKEN_PRICE_USD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_set_symbols_are_unique() {
        let mut symbols: Vec<&str> = SEED_TOKENS.iter().map(|t| t.symbol).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), SEED_TOKENS.len());
    }

    #[test]
    fn reward_token_is_in_seed_set() {
        assert!(SEED_TOKENS
            .iter()
            .any(|t| t.symbol == config::REWARD_TOKEN_SYMBOL));
    }

    #[test]
    fn name_lookup() {
        assert_eq!(name_for("WGR"), Some("Wegram"));
        assert_eq!(name_for("USDC"), Some("USD Coin"));
        assert_eq!(name_for("DOGE"), None);
    }

    #[test]
    fn price_table() {
        assert_eq!(price_usd("WGR"), config::WGR_PRICE_USD);
        assert_eq!(price_usd("SOL"), config::DEFAULT_TOKEN_PRICE_USD);
        assert_eq!(price_usd("ANYTHING"), config::DEFAULT_TOKEN_PRICE_USD);
    }
}
