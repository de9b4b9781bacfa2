//! # Ledger
//!
//! Holds the total supply, per-account balances, and per-(owner, spender)
//! allowances of a single token, and exposes the state transitions that move
//! them.
//!
//! ## Invariants
//!
//! - `total_supply` equals the sum of all balances. Only genesis issuance and
//!   burns change it.
//! - Balances and allowances are unsigned and only ever changed through
//!   `checked_add` / `checked_sub`. Nothing wraps, nothing is clamped.
//! - Zero entries are removed, so absent and zero are the same state.
//!
//! ## Atomicity
//!
//! Every mutating operation runs in two phases. The *plan* phase reads the
//! current state, checks every precondition, and computes every new value.
//! The *commit* phase writes those values and cannot fail. A rejected
//! operation therefore never reaches a write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::address::Address;
use crate::config::TokenConfig;
use crate::operation::LedgerEvent;

/// Token amount in base units.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejections returned by ledger operations. Every variant means the
/// operation had no effect at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A required account was the null address.
    #[error("invalid target: {role} must not be the null address")]
    InvalidTarget {
        /// Which parameter was null (`recipient`, `spender`, `owner`, ...).
        role: &'static str,
    },

    /// The payer does not hold enough funds.
    #[error("insufficient balance: {account} holds {balance}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// Its current balance.
        balance: Amount,
        /// The amount the operation needed.
        requested: Amount,
    },

    /// The spender's remaining allowance is too small.
    #[error(
        "insufficient allowance: {spender} may move {allowance} from {owner}, requested {requested}"
    )]
    InsufficientAllowance {
        /// Owner of the funds.
        owner: Address,
        /// Delegate attempting to spend.
        spender: Address,
        /// Remaining allowance.
        allowance: Amount,
        /// The amount the operation needed.
        requested: Amount,
    },

    /// A computed value would fall below zero or exceed `u128::MAX`.
    #[error("arithmetic bounds exceeded in {operation}: current {current}, delta {delta}")]
    ArithmeticBounds {
        /// Operation that produced the out-of-range value.
        operation: &'static str,
        /// Value before the adjustment.
        current: Amount,
        /// Adjustment that could not be applied.
        delta: Amount,
    },
}

/// Coarse classification of a [`LedgerError`], for callers that only need to
/// know which invariant was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidTarget,
    InsufficientBalance,
    InsufficientAllowance,
    ArithmeticBounds,
}

impl LedgerError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidTarget { .. } => ErrorKind::InvalidTarget,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            LedgerError::ArithmeticBounds { .. } => ErrorKind::ArithmeticBounds,
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Static token metadata, fixed at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable name (e.g., "GPT Guru Token.").
    pub name: String,
    /// Ticker symbol (e.g., "GPTG").
    pub symbol: String,
    /// Number of decimal places.
    ///
    /// Display only. A token with `decimals = 2` and raw amount `12345`
    /// displays as `123.45`; the ledger itself never divides.
    pub decimals: u8,
}

impl TokenMetadata {
    /// Renders a base-unit amount as a decimal string, trimming trailing
    /// fractional zeros.
    pub fn format_amount(&self, amount: Amount) -> String {
        let decimals = usize::from(self.decimals);
        if decimals == 0 {
            return amount.to_string();
        }
        let digits = format!("{:0>width$}", amount, width = decimals + 1);
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        }
    }
}

impl From<&TokenConfig> for TokenMetadata {
    fn from(config: &TokenConfig) -> Self {
        Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Validated balance movement, ready to commit.
struct TransferPlan {
    from: Address,
    to: Address,
    from_after: Amount,
    to_after: Amount,
}

/// Validated debit that also leaves circulation.
struct BurnPlan {
    from: Address,
    from_after: Amount,
    supply_after: Amount,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The complete state of one token.
///
/// Owned by a single context that applies operations sequentially. For
/// shared multi-threaded access wrap it in a
/// [`SharedLedger`](crate::shared::SharedLedger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    metadata: TokenMetadata,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl Ledger {
    /// Creates a ledger and credits the full initial supply to `issuer`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTarget`] if `issuer` is the null address.
    pub fn genesis(config: &TokenConfig, issuer: Address) -> Result<Self, LedgerError> {
        require_account(issuer, "issuer")?;

        let mut balances = HashMap::new();
        if config.initial_supply > 0 {
            balances.insert(issuer, config.initial_supply);
        }

        Ok(Self {
            metadata: TokenMetadata::from(config),
            total_supply: config.initial_supply,
            balances,
            allowances: HashMap::new(),
        })
    }

    /// Reassembles a ledger from parts that the caller has already
    /// validated. Used by snapshot restore.
    pub(crate) fn from_parts(
        metadata: TokenMetadata,
        total_supply: Amount,
        balances: HashMap<Address, Amount>,
        allowances: HashMap<(Address, Address), Amount>,
    ) -> Self {
        Self {
            metadata,
            total_supply,
            balances,
            allowances,
        }
    }

    // -- Metadata -----------------------------------------------------------

    /// Token name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    /// Token decimals.
    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// All static metadata.
    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    // -- Queries ------------------------------------------------------------

    /// Amount currently in circulation.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of `account`, zero if it has never been credited.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move out of `owner`'s balance.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Number of accounts with a non-zero balance.
    pub fn holders(&self) -> usize {
        self.balances.len()
    }

    pub(crate) fn balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    pub(crate) fn allowances(&self) -> impl Iterator<Item = (&(Address, Address), &Amount)> {
        self.allowances.iter()
    }

    // -- Transfers ----------------------------------------------------------

    /// Moves `amount` from `caller` to `to`.
    ///
    /// A self-transfer is validated like any other and then leaves the
    /// balance unchanged.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller` or `to` is null.
    /// - [`LedgerError::InsufficientBalance`] if `caller` holds less than `amount`.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(to, "recipient")?;

        let plan = self.plan_transfer(caller, to, amount)?;
        self.commit_transfer(plan);

        Ok(LedgerEvent::Transfer {
            from: caller,
            to,
            amount,
        })
    }

    /// Moves `amount` from `from` to `to`, spending `caller`'s allowance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller`, `from` or `to` is null.
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is short.
    /// - [`LedgerError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(from, "owner")?;
        require_account(to, "recipient")?;

        let allowance_after = self.plan_spend_allowance(from, caller, amount)?;
        let plan = self.plan_transfer(from, to, amount)?;

        self.write_allowance(from, caller, allowance_after);
        self.commit_transfer(plan);

        Ok(LedgerEvent::Transfer { from, to, amount })
    }

    // -- Allowances ---------------------------------------------------------

    /// Sets `spender`'s allowance over `caller`'s funds to exactly `amount`.
    ///
    /// This overwrites any previous value. A spender watching for the change
    /// can spend the old allowance before the new one lands; callers that
    /// care should use [`increase_allowance`](Self::increase_allowance) and
    /// [`decrease_allowance`](Self::decrease_allowance).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTarget`] if `caller` or `spender` is null.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(spender, "spender")?;

        self.write_allowance(caller, spender, amount);

        Ok(LedgerEvent::Approval {
            owner: caller,
            spender,
            amount,
        })
    }

    /// Raises `spender`'s allowance over `caller`'s funds by `delta`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller` or `spender` is null.
    /// - [`LedgerError::ArithmeticBounds`] if the new allowance overflows.
    pub fn increase_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(spender, "spender")?;

        let current = self.allowance(&caller, &spender);
        let amount = current
            .checked_add(delta)
            .ok_or(LedgerError::ArithmeticBounds {
                operation: "increase_allowance",
                current,
                delta,
            })?;

        self.write_allowance(caller, spender, amount);

        Ok(LedgerEvent::Approval {
            owner: caller,
            spender,
            amount,
        })
    }

    /// Lowers `spender`'s allowance over `caller`'s funds by `delta`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller` or `spender` is null.
    /// - [`LedgerError::ArithmeticBounds`] if `delta` exceeds the allowance.
    pub fn decrease_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(spender, "spender")?;

        let current = self.allowance(&caller, &spender);
        let amount = current
            .checked_sub(delta)
            .ok_or(LedgerError::ArithmeticBounds {
                operation: "decrease_allowance",
                current,
                delta,
            })?;

        self.write_allowance(caller, spender, amount);

        Ok(LedgerEvent::Approval {
            owner: caller,
            spender,
            amount,
        })
    }

    // -- Burns --------------------------------------------------------------

    /// Destroys `amount` of `caller`'s tokens, shrinking total supply.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller` is null.
    /// - [`LedgerError::InsufficientBalance`] if `caller` holds less than `amount`.
    pub fn burn(&mut self, caller: Address, amount: Amount) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;

        let plan = self.plan_burn(caller, amount)?;
        self.commit_burn(plan);

        Ok(LedgerEvent::Transfer {
            from: caller,
            to: Address::ZERO,
            amount,
        })
    }

    /// Destroys `amount` of `from`'s tokens, spending `caller`'s allowance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTarget`] if `caller` or `from` is null.
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is short.
    /// - [`LedgerError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn burn_from(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
    ) -> Result<LedgerEvent, LedgerError> {
        require_account(caller, "caller")?;
        require_account(from, "owner")?;

        let allowance_after = self.plan_spend_allowance(from, caller, amount)?;
        let plan = self.plan_burn(from, amount)?;

        self.write_allowance(from, caller, allowance_after);
        self.commit_burn(plan);

        Ok(LedgerEvent::Transfer {
            from,
            to: Address::ZERO,
            amount,
        })
    }

    // -- Internals ----------------------------------------------------------

    fn debited_balance(&self, account: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let balance = self.balance_of(&account);
        balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account,
                balance,
                requested: amount,
            })
    }

    fn plan_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferPlan, LedgerError> {
        let from_after = self.debited_balance(from, amount)?;

        // For a self-transfer the credit lands on the already-debited value,
        // which restores the original balance.
        let to_before = if from == to {
            from_after
        } else {
            self.balance_of(&to)
        };
        let to_after = to_before
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticBounds {
                operation: "credit",
                current: to_before,
                delta: amount,
            })?;

        Ok(TransferPlan {
            from,
            to,
            from_after,
            to_after,
        })
    }

    fn commit_transfer(&mut self, plan: TransferPlan) {
        self.write_balance(plan.from, plan.from_after);
        self.write_balance(plan.to, plan.to_after);
    }

    fn plan_burn(&self, from: Address, amount: Amount) -> Result<BurnPlan, LedgerError> {
        let from_after = self.debited_balance(from, amount)?;
        let supply_after = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticBounds {
                operation: "burn",
                current: self.total_supply,
                delta: amount,
            })?;

        Ok(BurnPlan {
            from,
            from_after,
            supply_after,
        })
    }

    fn commit_burn(&mut self, plan: BurnPlan) {
        self.write_balance(plan.from, plan.from_after);
        self.total_supply = plan.supply_after;
    }

    fn plan_spend_allowance(
        &self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let allowance = self.allowance(&owner, &spender);
        allowance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                requested: amount,
            })
    }

    fn write_balance(&mut self, account: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn write_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }
}

fn require_account(account: Address, role: &'static str) -> Result<(), LedgerError> {
    if account.is_zero() {
        return Err(LedgerError::InvalidTarget { role });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INITIAL_SUPPLY;

    const ISSUER: Address = Address::repeat_byte(0x11);
    const ALICE: Address = Address::repeat_byte(0xA1);
    const BOB: Address = Address::repeat_byte(0xB0);

    fn small_ledger(supply: Amount) -> Ledger {
        let config = TokenConfig {
            initial_supply: supply,
            ..TokenConfig::default()
        };
        Ledger::genesis(&config, ISSUER).unwrap()
    }

    fn sum_of_balances(ledger: &Ledger) -> Amount {
        ledger.balances().map(|(_, amount)| *amount).sum()
    }

    #[test]
    fn genesis_credits_issuer() {
        let ledger = Ledger::genesis(&TokenConfig::default(), ISSUER).unwrap();
        assert_eq!(ledger.total_supply(), INITIAL_SUPPLY);
        assert_eq!(ledger.balance_of(&ISSUER), INITIAL_SUPPLY);
        assert_eq!(ledger.holders(), 1);
    }

    #[test]
    fn genesis_rejects_null_issuer() {
        let err = Ledger::genesis(&TokenConfig::default(), Address::ZERO).unwrap_err();
        assert_eq!(err, LedgerError::InvalidTarget { role: "issuer" });
    }

    #[test]
    fn genesis_with_zero_supply_has_no_holders() {
        let ledger = small_ledger(0);
        assert_eq!(ledger.total_supply(), 0);
        assert_eq!(ledger.holders(), 0);
    }

    #[test]
    fn transfer_moves_funds() {
        let mut ledger = small_ledger(1_000);
        let event = ledger.transfer(ISSUER, ALICE, 400).unwrap();

        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: ISSUER,
                to: ALICE,
                amount: 400
            }
        );
        assert_eq!(ledger.balance_of(&ISSUER), 600);
        assert_eq!(ledger.balance_of(&ALICE), 400);
        assert_eq!(ledger.total_supply(), 1_000);
    }

    #[test]
    fn transfer_entire_balance_removes_entry() {
        let mut ledger = small_ledger(1_000);
        ledger.transfer(ISSUER, ALICE, 1_000).unwrap();
        assert_eq!(ledger.balance_of(&ISSUER), 0);
        assert_eq!(ledger.holders(), 1);
    }

    #[test]
    fn transfer_to_null_rejected() {
        let mut ledger = small_ledger(1_000);
        let before = ledger.clone();
        let err = ledger.transfer(ISSUER, Address::ZERO, 1).unwrap_err();
        assert_eq!(err, LedgerError::InvalidTarget { role: "recipient" });
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_from_null_caller_rejected() {
        let mut ledger = small_ledger(1_000);
        let err = ledger.transfer(Address::ZERO, ALICE, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);
    }

    #[test]
    fn transfer_insufficient_balance_rejected() {
        let mut ledger = small_ledger(1_000);
        let before = ledger.clone();
        let err = ledger.transfer(ALICE, BOB, 1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: ALICE,
                balance: 0,
                requested: 1
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn self_transfer_is_validated_noop() {
        let mut ledger = small_ledger(1_000);
        ledger.transfer(ISSUER, ISSUER, 1_000).unwrap();
        assert_eq!(ledger.balance_of(&ISSUER), 1_000);

        let err = ledger.transfer(ISSUER, ISSUER, 1_001).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(ledger.balance_of(&ISSUER), 1_000);
    }

    #[test]
    fn zero_amount_transfer_succeeds_without_creating_entries() {
        let mut ledger = small_ledger(1_000);
        ledger.transfer(ALICE, BOB, 0).unwrap();
        assert_eq!(ledger.holders(), 1);
    }

    #[test]
    fn approve_overwrites() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ISSUER, ALICE, 500).unwrap();
        ledger.approve(ISSUER, ALICE, 200).unwrap();
        assert_eq!(ledger.allowance(&ISSUER, &ALICE), 200);
        assert_eq!(ledger.allowance(&ALICE, &ISSUER), 0);
    }

    #[test]
    fn approve_null_spender_rejected() {
        let mut ledger = small_ledger(1_000);
        let err = ledger.approve(ISSUER, Address::ZERO, 5).unwrap_err();
        assert_eq!(err, LedgerError::InvalidTarget { role: "spender" });
    }

    #[test]
    fn approve_does_not_require_balance() {
        let mut ledger = small_ledger(1_000);
        let event = ledger.approve(ALICE, BOB, 10_000).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Approval {
                owner: ALICE,
                spender: BOB,
                amount: 10_000
            }
        );
    }

    #[test]
    fn increase_allowance_overflow_rejected() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ISSUER, ALICE, Amount::MAX).unwrap();
        let err = ledger.increase_allowance(ISSUER, ALICE, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticBounds);
        assert_eq!(ledger.allowance(&ISSUER, &ALICE), Amount::MAX);
    }

    #[test]
    fn decrease_allowance_below_zero_rejected() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ISSUER, ALICE, 100).unwrap();
        let err = ledger.decrease_allowance(ISSUER, ALICE, 101).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ArithmeticBounds {
                operation: "decrease_allowance",
                current: 100,
                delta: 101
            }
        );
        assert_eq!(ledger.allowance(&ISSUER, &ALICE), 100);
    }

    #[test]
    fn allowance_adjustments_report_new_value() {
        let mut ledger = small_ledger(1_000);
        let up = ledger.increase_allowance(ISSUER, ALICE, 300).unwrap();
        let down = ledger.decrease_allowance(ISSUER, ALICE, 120).unwrap();
        assert_eq!(
            up,
            LedgerEvent::Approval {
                owner: ISSUER,
                spender: ALICE,
                amount: 300
            }
        );
        assert_eq!(
            down,
            LedgerEvent::Approval {
                owner: ISSUER,
                spender: ALICE,
                amount: 180
            }
        );
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ISSUER, ALICE, 300).unwrap();
        ledger.transfer_from(ALICE, ISSUER, BOB, 250).unwrap();

        assert_eq!(ledger.allowance(&ISSUER, &ALICE), 50);
        assert_eq!(ledger.balance_of(&ISSUER), 750);
        assert_eq!(ledger.balance_of(&BOB), 250);
        assert_eq!(ledger.balance_of(&ALICE), 0);
    }

    #[test]
    fn transfer_from_with_allowance_but_no_balance_is_atomic() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ALICE, BOB, 500).unwrap();
        let before = ledger.clone();

        let err = ledger.transfer_from(BOB, ALICE, ISSUER, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(ledger, before);
        assert_eq!(ledger.allowance(&ALICE, &BOB), 500);
    }

    #[test]
    fn transfer_from_to_null_rejected() {
        let mut ledger = small_ledger(1_000);
        ledger.approve(ISSUER, ALICE, 300).unwrap();
        let err = ledger
            .transfer_from(ALICE, ISSUER, Address::ZERO, 100)
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidTarget { role: "recipient" });
        assert_eq!(ledger.allowance(&ISSUER, &ALICE), 300);
    }

    #[test]
    fn owner_cannot_spend_own_funds_via_transfer_from_without_allowance() {
        let mut ledger = small_ledger(1_000);
        let err = ledger.transfer_from(ISSUER, ISSUER, BOB, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
    }

    #[test]
    fn burn_shrinks_supply() {
        let mut ledger = small_ledger(1_000);
        let event = ledger.burn(ISSUER, 300).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: ISSUER,
                to: Address::ZERO,
                amount: 300
            }
        );
        assert_eq!(ledger.balance_of(&ISSUER), 700);
        assert_eq!(ledger.total_supply(), 700);
        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut ledger = small_ledger(1_000);
        let before = ledger.clone();
        let err = ledger.burn(ISSUER, 1_001).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(ledger, before);
    }

    #[test]
    fn burn_from_requires_allowance_then_balance() {
        let mut ledger = small_ledger(1_000);
        ledger.transfer(ISSUER, ALICE, 100).unwrap();
        ledger.approve(ALICE, BOB, 500).unwrap();

        let err = ledger.burn_from(BOB, ALICE, 200).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(ledger.allowance(&ALICE, &BOB), 500);

        ledger.burn_from(BOB, ALICE, 100).unwrap();
        assert_eq!(ledger.allowance(&ALICE, &BOB), 400);
        assert_eq!(ledger.balance_of(&ALICE), 0);
        assert_eq!(ledger.total_supply(), 900);
    }

    #[test]
    fn burn_from_null_owner_rejected() {
        let mut ledger = small_ledger(1_000);
        let err = ledger.burn_from(BOB, Address::ZERO, 0).unwrap_err();
        assert_eq!(err, LedgerError::InvalidTarget { role: "owner" });
    }

    #[test]
    fn unknown_keys_read_as_zero() {
        let ledger = small_ledger(1_000);
        assert_eq!(ledger.balance_of(&ALICE), 0);
        assert_eq!(ledger.allowance(&ALICE, &BOB), 0);
    }

    #[test]
    fn metadata_accessors() {
        let ledger = small_ledger(1);
        assert_eq!(ledger.name(), "GPT Guru Token.");
        assert_eq!(ledger.symbol(), "GPTG");
        assert_eq!(ledger.decimals(), 18);
    }

    #[test]
    fn format_amount_renders_decimals() {
        let meta = TokenMetadata {
            name: "T".into(),
            symbol: "T".into(),
            decimals: 18,
        };
        assert_eq!(meta.format_amount(INITIAL_SUPPLY), "2000000000");
        assert_eq!(meta.format_amount(100_000), "0.0000000000001");
        assert_eq!(meta.format_amount(1_500_000_000_000_000_000), "1.5");
        assert_eq!(meta.format_amount(0), "0");

        let whole = TokenMetadata { decimals: 0, ..meta };
        assert_eq!(whole.format_amount(42), "42");
    }

    #[test]
    fn error_messages_name_the_violation() {
        let err = LedgerError::InsufficientAllowance {
            owner: ISSUER,
            spender: ALICE,
            allowance: 5,
            requested: 6,
        };
        let text = err.to_string();
        assert!(text.starts_with("insufficient allowance"));
        assert!(text.contains("requested 6"));
    }
}
