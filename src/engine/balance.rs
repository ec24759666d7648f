//! Customer balance reconciliation.
//!
//! The prepaid balance is a pure function of the customer's ledger: a full
//! recompute over every entry, never an incremental counter. Re-running the
//! recompute without intervening mutations always yields the same value, so
//! the balance can never drift from the ledger even after out-of-band
//! deletions.

use crate::domain::{Decimal, LedgerEntry};

/// Recompute a customer's prepaid balance from their full ledger.
///
/// `balance = sum(deposits) - sum(balance_used, including legacy withdraw
/// rows)`. Payments, refunds, and untyped legacy rows have no effect.
pub fn recompute_balance(entries: &[LedgerEntry]) -> Decimal {
    entries.iter().fold(Decimal::zero(), |acc, e| {
        match e.kind.balance_sign() {
            Some(1) => acc + e.amount,
            Some(-1) => acc - e.amount,
            _ => acc,
        }
    })
}
