//! # Operations & Events
//!
//! [`Operation`] is the request form of every mutating ledger call, so the
//! sequencing layer (or the `gptg-node` CLI) can hand requests in as data.
//! The caller identity is never part of the operation: it arrives already
//! authenticated, alongside it.
//!
//! [`LedgerEvent`] is what a committed operation reports back. The ledger
//! does not deliver events anywhere; it returns them.
//!
//! Both enums use serde's default external tagging. Internally tagged enums
//! buffer through an intermediate representation that cannot carry `u128`.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::ledger::{Amount, Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A mutating request against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Move the caller's funds to `to`.
    Transfer { to: Address, amount: Amount },
    /// Set `spender`'s allowance over the caller's funds.
    Approve { spender: Address, amount: Amount },
    /// Raise `spender`'s allowance by `delta`.
    IncreaseAllowance { spender: Address, delta: Amount },
    /// Lower `spender`'s allowance by `delta`.
    DecreaseAllowance { spender: Address, delta: Amount },
    /// Move `from`'s funds to `to` using the caller's allowance.
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// Destroy the caller's funds.
    Burn { amount: Amount },
    /// Destroy `from`'s funds using the caller's allowance.
    BurnFrom { from: Address, amount: Amount },
}

impl Operation {
    /// Contract-style name of the operation, for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Transfer { .. } => "transfer",
            Operation::Approve { .. } => "approve",
            Operation::IncreaseAllowance { .. } => "increaseAllowance",
            Operation::DecreaseAllowance { .. } => "decreaseAllowance",
            Operation::TransferFrom { .. } => "transferFrom",
            Operation::Burn { .. } => "burn",
            Operation::BurnFrom { .. } => "burnFrom",
        }
    }
}

// ---------------------------------------------------------------------------
// LedgerEvent
// ---------------------------------------------------------------------------

/// The observable effect of a committed operation.
///
/// Burns are reported as a `Transfer` to [`Address::ZERO`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Funds moved (or left circulation when `to` is null).
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// An allowance now has the value `amount`.
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl Ledger {
    /// Applies `operation` on behalf of the authenticated `caller`.
    pub fn execute(
        &mut self,
        caller: Address,
        operation: &Operation,
    ) -> Result<LedgerEvent, LedgerError> {
        match *operation {
            Operation::Transfer { to, amount } => self.transfer(caller, to, amount),
            Operation::Approve { spender, amount } => self.approve(caller, spender, amount),
            Operation::IncreaseAllowance { spender, delta } => {
                self.increase_allowance(caller, spender, delta)
            }
            Operation::DecreaseAllowance { spender, delta } => {
                self.decrease_allowance(caller, spender, delta)
            }
            Operation::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, amount)
            }
            Operation::Burn { amount } => self.burn(caller, amount),
            Operation::BurnFrom { from, amount } => self.burn_from(caller, from, amount),
        }
    }
}
