//! # Ledger Snapshots & State Root
//!
//! A [`LedgerSnapshot`] is the persisted form of a ledger: the token metadata,
//! the total supply, and the balance and allowance maps flattened into sorted
//! `(key, amount)` rows. Nothing else needs to survive a restart.
//!
//! Restoring is the one place where state enters the ledger without going
//! through a transition, so [`Ledger::restore`] re-checks every invariant
//! before accepting it.
//!
//! ## State Root
//!
//! Replicas that apply the same operations in the same order must end in
//! the same state. [`LedgerSnapshot::state_root`] condenses the canonical
//! snapshot into a 32-byte BLAKE3 digest so two replicas can compare a hash
//! instead of their full maps:
//!
//! ```text
//! leaves = [ BLAKE3(tag || key || amount_be) for each sorted row ]
//!          ++ [ BLAKE3("supply" || total_supply_be), BLAKE3("meta" || metadata) ]
//! root   = merkle_root(leaves)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::address::Address;
use crate::ledger::{Amount, Ledger, TokenMetadata};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a snapshot cannot become a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A row was keyed by the null address.
    #[error("snapshot contains the null address in {0}")]
    NullAccount(&'static str),

    /// The same key appeared twice.
    #[error("duplicate {table} entry for {key}")]
    DuplicateEntry {
        /// `balances` or `allowances`.
        table: &'static str,
        /// The repeated key.
        key: String,
    },

    /// The balances add up to more than `u128::MAX`.
    #[error("balance sum overflows")]
    BalanceOverflow,

    /// The recorded supply disagrees with the balances.
    #[error("supply mismatch: recorded {recorded}, balances sum to {computed}")]
    SupplyMismatch {
        /// `total_supply` as stored.
        recorded: Amount,
        /// Sum of all balance rows.
        computed: Amount,
    },
}

// ---------------------------------------------------------------------------
// LedgerSnapshot
// ---------------------------------------------------------------------------

/// Canonical, serializable image of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Static token metadata.
    pub metadata: TokenMetadata,
    /// Total supply at the time of the snapshot.
    pub total_supply: Amount,
    /// Non-zero balances, sorted by account.
    pub balances: Vec<(Address, Amount)>,
    /// Non-zero allowances as `(owner, spender, amount)`, sorted by key.
    pub allowances: Vec<(Address, Address, Amount)>,
}

impl LedgerSnapshot {
    /// Computes the BLAKE3 state root of this snapshot.
    ///
    /// Rows are hashed in their stored order, so call this on snapshots
    /// produced by [`Ledger::snapshot`] (which sorts) or sort first.
    pub fn state_root(&self) -> [u8; 32] {
        let mut leaves: Vec<[u8; 32]> =
            Vec::with_capacity(self.balances.len() + self.allowances.len() + 2);

        for (account, amount) in &self.balances {
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"balance");
            hasher.update(account.as_bytes());
            hasher.update(&amount.to_be_bytes());
            leaves.push(*hasher.finalize().as_bytes());
        }

        for (owner, spender, amount) in &self.allowances {
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"allowance");
            hasher.update(owner.as_bytes());
            hasher.update(spender.as_bytes());
            hasher.update(&amount.to_be_bytes());
            leaves.push(*hasher.finalize().as_bytes());
        }

        let mut supply = blake3::Hasher::new();
        supply.update(b"supply");
        supply.update(&self.total_supply.to_be_bytes());
        leaves.push(*supply.finalize().as_bytes());

        let mut meta = blake3::Hasher::new();
        meta.update(b"meta");
        meta.update(self.metadata.name.as_bytes());
        meta.update(&[0x00]);
        meta.update(self.metadata.symbol.as_bytes());
        meta.update(&[0x00, self.metadata.decimals]);
        leaves.push(*meta.finalize().as_bytes());

        merkle_root(leaves)
    }
}

/// Folds leaf hashes pairwise until one remains. An odd node is paired with
/// itself.
fn merkle_root(mut level: Vec<[u8; 32]>) -> [u8; 32] {
    if level.is_empty() {
        return [0u8; 32];
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let mut hasher = blake3::Hasher::new();
            hasher.update(&chunk[0]);
            hasher.update(chunk.get(1).unwrap_or(&chunk[0]));
            next.push(*hasher.finalize().as_bytes());
        }
        level = next;
    }

    level[0]
}

// ---------------------------------------------------------------------------
// Ledger <-> Snapshot
// ---------------------------------------------------------------------------

impl Ledger {
    /// Captures the current state in canonical (sorted) form.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut balances: Vec<(Address, Amount)> = self
            .balances()
            .map(|(account, amount)| (*account, *amount))
            .collect();
        balances.sort_unstable();

        let mut allowances: Vec<(Address, Address, Amount)> = self
            .allowances()
            .map(|((owner, spender), amount)| (*owner, *spender, *amount))
            .collect();
        allowances.sort_unstable();

        LedgerSnapshot {
            metadata: self.metadata().clone(),
            total_supply: self.total_supply(),
            balances,
            allowances,
        }
    }

    /// State root of the current state. See [`LedgerSnapshot::state_root`].
    pub fn state_root(&self) -> [u8; 32] {
        self.snapshot().state_root()
    }

    /// Rebuilds a ledger from a snapshot after checking every invariant.
    ///
    /// Zero-valued rows are accepted and dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] for null keys, duplicate keys, an
    /// overflowing balance sum, or a supply that disagrees with the balances.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, SnapshotError> {
        let mut balances = HashMap::with_capacity(snapshot.balances.len());
        let mut computed: Amount = 0;

        for (account, amount) in snapshot.balances {
            if account.is_zero() {
                return Err(SnapshotError::NullAccount("balances"));
            }
            if balances.insert(account, amount).is_some() {
                return Err(SnapshotError::DuplicateEntry {
                    table: "balances",
                    key: account.to_hex(),
                });
            }
            computed = computed
                .checked_add(amount)
                .ok_or(SnapshotError::BalanceOverflow)?;
        }
        balances.retain(|_, amount| *amount > 0);

        if computed != snapshot.total_supply {
            return Err(SnapshotError::SupplyMismatch {
                recorded: snapshot.total_supply,
                computed,
            });
        }

        let mut allowances = HashMap::with_capacity(snapshot.allowances.len());
        for (owner, spender, amount) in snapshot.allowances {
            if owner.is_zero() || spender.is_zero() {
                return Err(SnapshotError::NullAccount("allowances"));
            }
            if allowances.insert((owner, spender), amount).is_some() {
                return Err(SnapshotError::DuplicateEntry {
                    table: "allowances",
                    key: format!("{owner}/{spender}"),
                });
            }
        }
        allowances.retain(|_, amount| *amount > 0);

        Ok(Ledger::from_parts(
            snapshot.metadata,
            snapshot.total_supply,
            balances,
            allowances,
        ))
    }
}
