//! # LedgerDb — Persistent Storage
//!
//! Durable home of a ledger, built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree         | Key                        | Value                     |
//! |--------------|----------------------------|---------------------------|
//! | `balances`   | `account` (20B)            | `amount` (16B BE)         |
//! | `allowances` | `owner \|\| spender` (40B) | `amount` (16B BE)         |
//! | `metadata`   | key (UTF-8)                | value (bytes)             |
//!
//! The `metadata` tree holds the bincode-encoded token metadata under
//! `token` and the total supply under `total_supply`.
//!
//! ## Atomicity
//!
//! [`LedgerDb::save`] writes all three trees inside one sled transaction and
//! then flushes. Either the whole new state lands on disk or none of it does.
//! [`LedgerDb::load`] goes through [`Ledger::restore`], so a store whose
//! supply disagrees with its balances is refused rather than loaded.

use sled::transaction::{ConflictableTransactionResult, TransactionError, Transactional};
use sled::{Db, IVec, Tree};
use std::collections::HashSet;
use std::path::Path;

use crate::address::Address;
use crate::ledger::{Amount, Ledger, TokenMetadata};
use crate::snapshot::{LedgerSnapshot, SnapshotError};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("stored state failed validation: {0}")]
    Invalid(#[from] SnapshotError),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Metadata Keys
// ---------------------------------------------------------------------------

const META_TOKEN: &[u8] = b"token";
const META_TOTAL_SUPPLY: &[u8] = b"total_supply";

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent storage for one ledger.
///
/// sled trees are safe to share across threads, so `LedgerDb` can be
/// cloned freely. Writers must still be serialized by the owner of the
/// ledger, since `save` replaces the whole stored state.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    balances: Tree,
    allowances: Tree,
    metadata: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let balances = db.open_tree("balances")?;
        let allowances = db.open_tree("allowances")?;
        let metadata = db.open_tree("metadata")?;

        Ok(Self {
            db,
            balances,
            allowances,
            metadata,
        })
    }

    /// Returns `true` once a ledger has been saved here.
    pub fn is_initialized(&self) -> DbResult<bool> {
        Ok(self.metadata.contains_key(META_TOKEN)?)
    }

    /// Replaces the stored state with `ledger`'s current state.
    pub fn save(&self, ledger: &Ledger) -> DbResult<()> {
        let snapshot = ledger.snapshot();
        let token_bytes = bincode::serialize(&snapshot.metadata)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        let balance_rows: Vec<(Vec<u8>, [u8; 16])> = snapshot
            .balances
            .iter()
            .map(|(account, amount)| (account.as_bytes().to_vec(), amount.to_be_bytes()))
            .collect();
        let allowance_rows: Vec<(Vec<u8>, [u8; 16])> = snapshot
            .allowances
            .iter()
            .map(|(owner, spender, amount)| (allowance_key(owner, spender), amount.to_be_bytes()))
            .collect();

        // Keys on disk that are no longer in the ledger (balances or
        // allowances that went to zero) must be removed.
        let stale_balances = stale_keys(&self.balances, &balance_rows)?;
        let stale_allowances = stale_keys(&self.allowances, &allowance_rows)?;

        (&self.balances, &self.allowances, &self.metadata)
            .transaction(
                |(balances, allowances, metadata)| -> ConflictableTransactionResult<(), ()> {
                    for key in &stale_balances {
                        balances.remove(key.clone())?;
                    }
                    for (key, value) in &balance_rows {
                        balances.insert(key.as_slice(), &value[..])?;
                    }
                    for key in &stale_allowances {
                        allowances.remove(key.clone())?;
                    }
                    for (key, value) in &allowance_rows {
                        allowances.insert(key.as_slice(), &value[..])?;
                    }
                    metadata.insert(META_TOKEN, token_bytes.as_slice())?;
                    metadata.insert(
                        META_TOTAL_SUPPLY,
                        &snapshot.total_supply.to_be_bytes()[..],
                    )?;
                    Ok(())
                },
            )
            .map_err(|e| match e {
                TransactionError::Abort(()) => DbError::Corrupt("save aborted".into()),
                TransactionError::Storage(err) => DbError::Sled(err),
            })?;

        self.db.flush()?;

        tracing::debug!(
            holders = snapshot.balances.len(),
            allowances = snapshot.allowances.len(),
            total_supply = %snapshot.total_supply,
            "ledger saved"
        );

        Ok(())
    }

    /// Loads the stored ledger, or `None` if nothing has been saved yet.
    pub fn load(&self) -> DbResult<Option<Ledger>> {
        let Some(token_bytes) = self.metadata.get(META_TOKEN)? else {
            return Ok(None);
        };
        let metadata: TokenMetadata = bincode::deserialize(&token_bytes)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        let total_supply = match self.metadata.get(META_TOTAL_SUPPLY)? {
            Some(bytes) => decode_amount(&bytes)?,
            None => return Err(DbError::Corrupt("missing total_supply".into())),
        };

        let mut balances = Vec::with_capacity(self.balances.len());
        for entry in self.balances.iter() {
            let (key, value) = entry?;
            let account =
                Address::from_slice(&key).map_err(|e| DbError::Corrupt(e.to_string()))?;
            balances.push((account, decode_amount(&value)?));
        }

        let mut allowances = Vec::with_capacity(self.allowances.len());
        for entry in self.allowances.iter() {
            let (key, value) = entry?;
            if key.len() != 2 * Address::LEN {
                return Err(DbError::Corrupt(format!(
                    "allowance key has {} bytes",
                    key.len()
                )));
            }
            let (owner, spender) = key.split_at(Address::LEN);
            let owner = Address::from_slice(owner).map_err(|e| DbError::Corrupt(e.to_string()))?;
            let spender =
                Address::from_slice(spender).map_err(|e| DbError::Corrupt(e.to_string()))?;
            allowances.push((owner, spender, decode_amount(&value)?));
        }

        let ledger = Ledger::restore(LedgerSnapshot {
            metadata,
            total_supply,
            balances,
            allowances,
        })?;

        tracing::debug!(
            holders = ledger.holders(),
            total_supply = %ledger.total_supply(),
            "ledger loaded"
        );

        Ok(Some(ledger))
    }
}

fn allowance_key(owner: &Address, spender: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 * Address::LEN);
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(spender.as_bytes());
    key
}

fn stale_keys(tree: &Tree, rows: &[(Vec<u8>, [u8; 16])]) -> DbResult<Vec<IVec>> {
    let live: HashSet<&[u8]> = rows.iter().map(|(key, _)| key.as_slice()).collect();
    let mut stale = Vec::new();
    for key in tree.iter().keys() {
        let key = key?;
        if !live.contains(&key[..]) {
            stale.push(key);
        }
    }
    Ok(stale)
}

fn decode_amount(bytes: &[u8]) -> DbResult<Amount> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| DbError::Corrupt(format!("amount has {} bytes", bytes.len())))?;
    Ok(Amount::from_be_bytes(raw))
}
