// Copyright (c) 2026 Wegram Labs. MIT License.
// See LICENSE for details.

//! # Wegram Wallet CLI
//!
//! Entry point for the `wegram-cli` binary. Parses CLI arguments,
//! initializes logging, opens the local wallet database, and runs one
//! wallet operation per invocation.
//!
//! The binary always operates in local mode: there is no remote backend
//! on the command line, so the wallet behaves exactly like the app's
//! signed-out demo mode, persisted under the data directory.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;

use wegram_wallet::persist::SledStore;
use wegram_wallet::store::LocalWalletStore;
use wegram_wallet::{token, Session};

use cli::{Commands, WegramCli};
use logging::LogFormat;

type Store = LocalWalletStore<SledStore>;

fn main() -> Result<()> {
    let args = WegramCli::parse();
    logging::init_logging(
        "wegram_cli=info,wegram_wallet=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    match args.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        command => {
            let mut store = open_store(&args.data_dir)?;
            store.resolve(&Session::anonymous());
            run_command(&mut store, command)
        }
    }
}

/// Opens (or creates) the wallet database under the data directory.
fn open_store(data_dir: &Path) -> Result<Store> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
    let db_path = data_dir.join("db");
    let kv = SledStore::open(&db_path)
        .with_context(|| format!("failed to open wallet database at {}", db_path.display()))?;
    Ok(LocalWalletStore::local_only(kv))
}

fn run_command(store: &mut Store, command: Commands) -> Result<()> {
    match command {
        Commands::Show(args) => cmd_show(store, &args),
        Commands::Reward(args) => cmd_reward(store, &args),
        Commands::Update(args) => cmd_update(store, &args),
        Commands::ImportKey(args) => cmd_import_key(store, &args),
        Commands::ImportMnemonic(args) => cmd_import_mnemonic(store, &args),
        Commands::Reset(args) => cmd_reset(store, &args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_show(store: &Store, args: &cli::ShowArgs) -> Result<()> {
    let identity = store.identity().context("wallet failed to resolve")?;

    if args.json {
        let balances: Vec<_> = store
            .balances()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "symbol": entry.token_symbol,
                    "name": entry.token_name,
                    "balance": entry.balance,
                    "usdValue": entry.usd_value,
                })
            })
            .collect();
        let mut snapshot = serde_json::json!({
            "publicKey": identity.public_key,
            "balances": balances,
            "totalUsdValue": store.total_usd_value(),
        });
        if args.reveal {
            snapshot["privateKey"] = identity.private_key.expose().into();
            if let Some(mnemonic) = &identity.mnemonic {
                snapshot["mnemonic"] = mnemonic.expose().into();
            }
        }
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Wallet: {}", identity.public_key);
    if args.reveal {
        println!("Private key: {}", identity.private_key.expose());
        if let Some(mnemonic) = &identity.mnemonic {
            println!("Recovery phrase: {}", mnemonic.expose());
        }
    }
    println!();
    for entry in store.balances() {
        println!(
            "  {:<6} {:<10} {:>14.4}  ${:>10.2}",
            entry.token_symbol, entry.token_name, entry.balance, entry.usd_value
        );
    }
    println!();
    println!("Total: ${:.2}", store.total_usd_value());
    Ok(())
}

fn cmd_reward(store: &mut Store, args: &cli::RewardArgs) -> Result<()> {
    store
        .try_add_reward(args.amount, &args.token)
        .with_context(|| format!("failed to credit {} {}", args.amount, args.token))?;
    report_token(store, &args.token);
    Ok(())
}

fn cmd_update(store: &mut Store, args: &cli::UpdateArgs) -> Result<()> {
    let usd_value = args
        .usd_value
        .unwrap_or_else(|| args.balance * token::price_usd(&args.token));
    store
        .try_update_balance(&args.token, args.balance, usd_value)
        .with_context(|| format!("failed to update {}", args.token))?;
    report_token(store, &args.token);
    Ok(())
}

fn cmd_import_key(store: &mut Store, args: &cli::ImportKeyArgs) -> Result<()> {
    store
        .import_private_key(&args.key)
        .context("import failed")?;
    let identity = store.identity().context("wallet failed to resolve")?;
    println!("Imported. Wallet: {}", identity.public_key);
    Ok(())
}

fn cmd_import_mnemonic(store: &mut Store, args: &cli::ImportMnemonicArgs) -> Result<()> {
    let phrase = args.words.join(" ");
    store.import_mnemonic(&phrase).context("import failed")?;
    let identity = store.identity().context("wallet failed to resolve")?;
    println!("Imported. Wallet: {}", identity.public_key);
    Ok(())
}

fn cmd_reset(store: &mut Store, args: &cli::ResetArgs) -> Result<()> {
    if !args.yes {
        bail!("this deletes the wallet and its balances; pass --yes to confirm");
    }
    store.reset().context("reset failed")?;
    println!("Wallet deleted. The next command will create a fresh one.");
    Ok(())
}

fn print_version() {
    println!("wegram-cli {}", env!("CARGO_PKG_VERSION"));
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Prints a one-line summary of a single token row plus the new total.
fn report_token(store: &Store, symbol: &str) {
    match store
        .balances()
        .iter()
        .find(|entry| entry.token_symbol == symbol)
    {
        Some(entry) => println!(
            "{}: {:.4} (${:.2})  total ${:.2}",
            entry.token_symbol,
            entry.balance,
            entry.usd_value,
            store.total_usd_value()
        ),
        None => println!("{symbol}: not held by this wallet"),
    }
}
