// Copyright (c) 2026 GPT Guru. MIT License.
// See LICENSE for details.

//! # GPTG Ledger Node
//!
//! Entry point for the `gptg-node` binary. Parses CLI arguments, initializes
//! logging, and runs one command against the ledger stored in the data
//! directory.
//!
//! - `init`    — create the ledger from genesis parameters
//! - `exec`    — apply one operation as an authenticated caller
//! - `query`   — read supply, balances, allowances, metadata or state root
//! - `version` — print build version information
//!
//! Identity checks happen before this binary is invoked. Whatever address is
//! passed as `--caller` is trusted.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;

use gptg_ledger::{Ledger, LedgerDb, LedgerEvent, Operation, SharedLedger, TokenConfig};

use cli::{Commands, ExecArgs, GptgNodeCli, InitArgs, Query};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = GptgNodeCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    logging::init_logging(
        "gptg_node=info,gptg_ledger=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Init(args) => {
            let ledger = init_ledger(&cli.data_dir, &args)?;
            println!("Ledger initialized.");
            println!("  Data directory : {}", cli.data_dir.display());
            println!("  Token          : {} ({})", ledger.name(), ledger.symbol());
            println!("  Decimals       : {}", ledger.decimals());
            println!("  Issuer         : {}", args.issuer);
            println!("  Total supply   : {}", ledger.total_supply());
        }
        Commands::Exec(args) => {
            let event = exec_operation(&cli.data_dir, &args)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Commands::Query(args) => {
            println!("{}", run_query(&cli.data_dir, &args.query)?);
        }
        Commands::Version => unreachable!("handled before logging init"),
    }

    Ok(())
}

/// Creates a fresh ledger in `data_dir`. Refuses to touch an existing one.
fn init_ledger(data_dir: &Path, args: &InitArgs) -> Result<Ledger> {
    tracing::info!(data_dir = %data_dir.display(), issuer = %args.issuer, "initializing ledger");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let db = open_db(data_dir)?;
    if db.is_initialized()? {
        bail!("a ledger already exists in {}", data_dir.display());
    }

    let config = match &args.genesis {
        Some(path) => TokenConfig::from_json_file(path)
            .with_context(|| format!("failed to load genesis file {}", path.display()))?,
        None => TokenConfig::default(),
    };
    config.validate()?;

    let ledger = Ledger::genesis(&config, args.issuer)?;
    db.save(&ledger)?;

    tracing::info!(
        symbol = %ledger.symbol(),
        total_supply = %ledger.total_supply(),
        "genesis issued"
    );

    Ok(ledger)
}

/// Loads the ledger, applies one operation, and persists the result.
///
/// A rejected operation returns an error before anything is written.
fn exec_operation(data_dir: &Path, args: &ExecArgs) -> Result<LedgerEvent> {
    let operation: Operation =
        serde_json::from_str(&args.operation).context("failed to parse operation JSON")?;

    let db = open_db(data_dir)?;
    let ledger = SharedLedger::new(load_ledger(&db, data_dir)?);

    let event = ledger
        .execute(args.caller, &operation)
        .with_context(|| format!("{} rejected", operation.name()))?;

    ledger.read(|l| db.save(l))?;
    Ok(event)
}

/// Answers a read-only query against the stored ledger.
fn run_query(data_dir: &Path, query: &Query) -> Result<String> {
    let db = open_db(data_dir)?;
    let ledger = load_ledger(&db, data_dir)?;

    let out = match query {
        Query::Supply => ledger.total_supply().to_string(),
        Query::Balance { account } => ledger.balance_of(account).to_string(),
        Query::Allowance { owner, spender } => ledger.allowance(owner, spender).to_string(),
        Query::Info => format!(
            "name         : {}\nsymbol       : {}\ndecimals     : {}\ntotal supply : {} ({} {})\nholders      : {}",
            ledger.name(),
            ledger.symbol(),
            ledger.decimals(),
            ledger.total_supply(),
            ledger.metadata().format_amount(ledger.total_supply()),
            ledger.symbol(),
            ledger.holders(),
        ),
        Query::Root => hex::encode(ledger.state_root()),
    };
    Ok(out)
}

fn open_db(data_dir: &Path) -> Result<LedgerDb> {
    LedgerDb::open(data_dir.join("ledger"))
        .with_context(|| format!("failed to open ledger database in {}", data_dir.display()))
}

fn load_ledger(db: &LedgerDb, data_dir: &Path) -> Result<Ledger> {
    match db.load()? {
        Some(ledger) => Ok(ledger),
        None => bail!(
            "no ledger in {}; run `gptg-node init` first",
            data_dir.display()
        ),
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("gptg-node {}", env!("CARGO_PKG_VERSION"));
    println!("token     {}", gptg_ledger::config::TOKEN_SYMBOL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptg_ledger::config::INITIAL_SUPPLY;
    use gptg_ledger::Address;

    const ISSUER: Address = Address::repeat_byte(0x01);
    const WALLET: Address = Address::repeat_byte(0x02);

    fn init(dir: &Path) -> Ledger {
        init_ledger(
            dir,
            &InitArgs {
                issuer: ISSUER,
                genesis: None,
            },
        )
        .unwrap()
    }

    fn exec(dir: &Path, caller: Address, operation: String) -> Result<LedgerEvent> {
        exec_operation(dir, &ExecArgs { caller, operation })
    }

    #[test]
    fn init_then_query() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = init(dir.path());
        assert_eq!(ledger.total_supply(), INITIAL_SUPPLY);

        let supply = run_query(dir.path(), &Query::Supply).unwrap();
        assert_eq!(supply, INITIAL_SUPPLY.to_string());

        let info = run_query(dir.path(), &Query::Info).unwrap();
        assert!(info.contains("GPTG"));
        assert!(info.contains("2000000000 GPTG"));
    }

    #[test]
    fn init_twice_refused() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let err = init_ledger(
            dir.path(),
            &InitArgs {
                issuer: WALLET,
                genesis: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn exec_persists_committed_operations() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());

        let event = exec(
            dir.path(),
            ISSUER,
            format!(r#"{{"transfer":{{"to":"{WALLET}","amount":100000}}}}"#),
        )
        .unwrap();
        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: ISSUER,
                to: WALLET,
                amount: 100_000
            }
        );

        let balance = run_query(dir.path(), &Query::Balance { account: WALLET }).unwrap();
        assert_eq!(balance, "100000");
    }

    #[test]
    fn rejected_exec_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let root_before = run_query(dir.path(), &Query::Root).unwrap();

        let err = exec(
            dir.path(),
            WALLET,
            r#"{"burn":{"amount":300000}}"#.to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("burn rejected"));

        assert_eq!(run_query(dir.path(), &Query::Root).unwrap(), root_before);
    }

    #[test]
    fn query_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_query(dir.path(), &Query::Supply).is_err());
    }

    #[test]
    fn malformed_operation_rejected() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let err = exec(dir.path(), ISSUER, r#"{"mint":{"amount":1}}"#.to_string()).unwrap_err();
        assert!(err.to_string().contains("parse operation"));
    }
}
