//! # Shared Ledger Handle
//!
//! [`SharedLedger`] lets several threads use one ledger while keeping
//! execution serializable. Every mutating operation holds the write lock for
//! its entire transition. Every query holds the read lock, so readers only
//! ever see committed state.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::address::Address;
use crate::ledger::{Amount, Ledger, LedgerError};
use crate::operation::{LedgerEvent, Operation};
use crate::snapshot::LedgerSnapshot;

/// Cloneable, thread-safe handle to a single [`Ledger`].
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    /// Wraps `ledger` for shared access.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Applies `operation` for `caller` under the exclusive lock.
    pub fn execute(
        &self,
        caller: Address,
        operation: &Operation,
    ) -> Result<LedgerEvent, LedgerError> {
        let mut ledger = self.inner.write();
        let result = ledger.execute(caller, operation);

        match &result {
            Ok(event) => tracing::debug!(
                op = operation.name(),
                %caller,
                ?event,
                total_supply = %ledger.total_supply(),
                "operation committed"
            ),
            Err(err) => tracing::warn!(
                op = operation.name(),
                %caller,
                kind = ?err.kind(),
                error = %err,
                "operation rejected"
            ),
        }

        result
    }

    /// Runs `f` against one consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.inner.read())
    }

    /// See [`Ledger::balance_of`].
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.inner.read().balance_of(account)
    }

    /// See [`Ledger::allowance`].
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.inner.read().allowance(owner, spender)
    }

    /// See [`Ledger::total_supply`].
    pub fn total_supply(&self) -> Amount {
        self.inner.read().total_supply()
    }

    /// Canonical snapshot of the committed state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.read().snapshot()
    }
}
