//! # CLI Interface
//!
//! Command-line structure for `gptg-node`, using `clap` derive. Four
//! subcommands: `init`, `exec`, `query`, and `version`.

use clap::{Parser, Subcommand};
use gptg_ledger::Address;
use std::path::PathBuf;

/// GPTG ledger node.
///
/// Owns one persisted GPT Guru Token ledger and applies already-authenticated
/// operations to it, one at a time.
#[derive(Parser, Debug)]
#[command(
    name = "gptg-node",
    about = "GPT Guru Token ledger node",
    version,
    propagate_version = true
)]
pub struct GptgNodeCli {
    /// Directory holding the ledger database.
    #[arg(
        long,
        short = 'd',
        env = "GPTG_DATA_DIR",
        default_value = "./gptg-data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Log format: `pretty` or `json`.
    #[arg(long, env = "GPTG_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the ledger and credit the initial supply to the issuer.
    Init(InitArgs),
    /// Apply one operation on behalf of an authenticated caller.
    Exec(ExecArgs),
    /// Read balances, allowances, supply or metadata.
    Query(QueryArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Address that receives the full initial supply.
    #[arg(long)]
    pub issuer: Address,

    /// JSON genesis file (`name`, `symbol`, `decimals`, `initial_supply`).
    ///
    /// When omitted, the reference GPTG parameters are used.
    #[arg(long)]
    pub genesis: Option<PathBuf>,
}

/// Arguments for the `exec` subcommand.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Authenticated identity the operation runs as.
    #[arg(long, env = "GPTG_CALLER")]
    pub caller: Address,

    /// Operation as JSON, e.g. `{"transfer":{"to":"0x..","amount":100000}}`.
    pub operation: String,
}

/// Arguments for the `query` subcommand.
#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub query: Query,
}

/// Read-only queries.
#[derive(Subcommand, Debug)]
pub enum Query {
    /// Total supply in base units.
    Supply,
    /// Balance of an account.
    Balance { account: Address },
    /// Remaining allowance of `spender` over `owner`'s funds.
    Allowance { owner: Address, spender: Address },
    /// Token name, symbol, decimals and supply.
    Info,
    /// Hex state root of the stored ledger.
    Root,
}
