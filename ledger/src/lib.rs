// Copyright (c) 2026 GPT Guru. MIT License.
// See LICENSE for details.

//! # GPTG Ledger — Core Library
//!
//! The bookkeeping engine behind the GPT Guru Token (GPTG): a fixed-decimal
//! fungible asset with delegated spending and permanent burns. Every unit of
//! value that exists is a number in one of this crate's maps, so every line
//! that touches those maps is treated as safety-critical.
//!
//! ## Architecture
//!
//! - **address** — 20-byte account identities and the null identity.
//! - **config** — Reference token constants and genesis configuration.
//! - **ledger** — Balances, allowances, total supply, and the transitions
//!   that move them.
//! - **operation** — Serializable requests and the events they produce.
//! - **snapshot** — The persisted key/amount layout, validation on restore,
//!   and the state root used to compare replicas.
//! - **shared** — A lock-guarded handle for multi-threaded owners.
//! - **storage** — Durable sled-backed persistence.
//!
//! ## Design Principles
//!
//! 1. All monetary arithmetic is checked. Wrapping arithmetic and money do
//!    not mix, and neither do clamped results.
//! 2. Transitions validate first and commit second. A rejected operation
//!    leaves no trace.
//! 3. The ledger knows nothing about signatures, transport or fees. Callers
//!    hand it authenticated identities.
//! 4. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod address;
pub mod config;
pub mod ledger;
pub mod operation;
pub mod shared;
pub mod snapshot;
pub mod storage;

pub use address::{Address, AddressError};
pub use config::{ConfigError, TokenConfig};
pub use ledger::{Amount, ErrorKind, Ledger, LedgerError, TokenMetadata};
pub use operation::{LedgerEvent, Operation};
pub use shared::SharedLedger;
pub use snapshot::{LedgerSnapshot, SnapshotError};
pub use storage::{DbError, LedgerDb};
