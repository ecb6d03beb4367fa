//! Terminal walkthrough of the wallet lifecycle.
//!
//! Resolves wallets for an anonymous and an authenticated session, credits
//! rewards, simulates a remote outage, and recovers a wallet from its
//! phrase, all against in-memory backends.
//!
//! Run with:
//!   cargo run --example demo

use wegram_wallet::persist::{MemoryKv, MemoryRemote};
use wegram_wallet::store::{BackendMode, WalletStore};
use wegram_wallet::{keys, Session};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

fn section(title: &str) {
    println!();
    println!("{BOLD}{CYAN}== {title} =={RESET}");
}

fn print_portfolio<C, K>(store: &WalletStore<C, K>)
where
    C: wegram_wallet::persist::RemoteClient,
    K: wegram_wallet::persist::KeyValueStore,
{
    for entry in store.balances() {
        println!(
            "  {:<6} {:>12.4}  {DIM}${:.2}{RESET}",
            entry.token_symbol, entry.balance, entry.usd_value
        );
    }
    println!("  {BOLD}total ${:.2}{RESET}", store.total_usd_value());
}

fn main() {
    let mut store = WalletStore::new(Some(MemoryRemote::new()), MemoryKv::new());

    section("Anonymous session");
    store.resolve(&Session::anonymous());
    let identity = store.identity().expect("resolved");
    println!("  demo wallet {GREEN}{}{RESET}", identity.public_key);
    print_portfolio(&store);

    section("Signing in as user-1");
    let session = Session::authenticated("user-1");
    store.resolve(&session);
    let identity = store.identity().expect("resolved");
    println!("  fresh remote wallet {GREEN}{}{RESET}", identity.public_key);
    print_portfolio(&store);

    section("Earning engagement rewards");
    store.add_reward(10.0);
    store.add_reward(2.5);
    print_portfolio(&store);

    section("Remote outage");
    store
        .remote_client_mut()
        .expect("remote configured")
        .set_failing(true);
    store.resolve(&Session::anonymous());
    store.resolve(&session);
    match store.mode() {
        Some(BackendMode::Local) => {
            println!("  {YELLOW}service unreachable, degraded to the local demo wallet{RESET}")
        }
        other => println!("  unexpected mode: {other:?}"),
    }
    print_portfolio(&store);

    section("Recovering a wallet from its phrase");
    let donor = keys::generate();
    let phrase = donor.mnemonic.as_ref().expect("generated phrase");
    println!("  {DIM}{}{RESET}", phrase.expose());
    store
        .import_mnemonic(phrase.expose())
        .expect("own phrase imports");
    println!(
        "  imported {GREEN}{}{RESET}",
        store.identity().expect("resolved").public_key
    );
}
