//! # CLI Interface
//!
//! Defines the command-line argument structure for `wegram-cli` using
//! `clap` derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wegram_wallet::config;

/// Wegram wallet command-line tool.
///
/// Manages the on-device wallet: shows balances, credits rewards,
/// imports keys, and resets. State lives in a local database under the
/// data directory; there is no remote backend in the CLI.
#[derive(Parser, Debug)]
#[command(
    name = "wegram-cli",
    about = "Wegram wallet command-line tool",
    version,
    propagate_version = true
)]
pub struct WegramCli {
    /// Directory where the wallet database lives.
    ///
    /// Created on first use if it does not exist.
    #[arg(long, short = 'd', env = "WEGRAM_DATA_DIR", default_value = ".wegram", global = true)]
    pub data_dir: PathBuf,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "WEGRAM_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the wallet binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the wallet address, token balances, and portfolio total.
    Show(ShowArgs),
    /// Credit an engagement reward to the wallet.
    Reward(RewardArgs),
    /// Set a token's balance and USD value directly.
    Update(UpdateArgs),
    /// Replace the wallet keys with an imported base58 private key.
    ImportKey(ImportKeyArgs),
    /// Replace the wallet keys with ones recovered from a BIP-39 phrase.
    ImportMnemonic(ImportMnemonicArgs),
    /// Delete the wallet record and its balances.
    Reset(ResetArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Emit the wallet snapshot as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Include the private key and recovery phrase in the output.
    ///
    /// Off by default; only the public address is shown.
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the `reward` subcommand.
#[derive(Parser, Debug)]
pub struct RewardArgs {
    /// Amount of tokens to credit.
    pub amount: f64,

    /// Token symbol to credit. Defaults to the platform reward token.
    #[arg(long, short = 't', default_value = config::REWARD_TOKEN_SYMBOL)]
    pub token: String,
}

/// Arguments for the `update` subcommand.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Token symbol to update.
    pub token: String,

    /// New token balance.
    pub balance: f64,

    /// New USD value. Computed from the fixed token price when omitted.
    #[arg(long)]
    pub usd_value: Option<f64>,
}

/// Arguments for the `import-key` subcommand.
#[derive(Parser, Debug)]
pub struct ImportKeyArgs {
    /// Base58-encoded private key (64-byte keypair or 32-byte seed).
    pub key: String,
}

/// Arguments for the `import-mnemonic` subcommand.
#[derive(Parser, Debug)]
pub struct ImportMnemonicArgs {
    /// The BIP-39 recovery phrase, passed as separate words.
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

/// Arguments for the `reset` subcommand.
#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Skip the confirmation check. Without this flag nothing is deleted.
    #[arg(long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        WegramCli::command().debug_assert();
    }

    #[test]
    fn reward_defaults_to_platform_token() {
        let cli = WegramCli::parse_from(["wegram-cli", "reward", "5.0"]);
        match cli.command {
            Commands::Reward(args) => {
                assert_eq!(args.amount, 5.0);
                assert_eq!(args.token, "WGR");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mnemonic_words_collected() {
        let cli = WegramCli::parse_from(["wegram-cli", "import-mnemonic", "alpha", "beta"]);
        match cli.command {
            Commands::ImportMnemonic(args) => assert_eq!(args.words, ["alpha", "beta"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
