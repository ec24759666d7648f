//! Payment ledger entries and their closed kind set.

use crate::domain::{CustomerId, Decimal, EntryId, OrderId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a ledger entry.
///
/// The stored `kind` column is open-ended (older rows carry `withdraw`,
/// NULL, or free text); decoding maps every stored value into this closed
/// set exactly once, at the repository boundary, so business logic never
/// branches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Direct cash/transfer payment against a specific order.
    Payment,
    /// Customer pre-funds their account; not tied to an order.
    Deposit,
    /// Prepaid balance spent against an order.
    BalanceUsed,
    /// Reduces an order's effective paid total; excluded from balance math.
    Refund,
    /// Row predating the `kind` column. Payment-equivalent for summation,
    /// never balance-affecting.
    LegacyUntyped,
}

impl EntryKind {
    /// Canonical stored form for entries created by this engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Payment => "payment",
            EntryKind::Deposit => "deposit",
            EntryKind::BalanceUsed => "balance_used",
            EntryKind::Refund => "refund",
            EntryKind::LegacyUntyped => "legacy",
        }
    }

    /// Map a stored kind (possibly missing or historical) into the closed set.
    ///
    /// `withdraw` is the historical spelling of `balance_used` and keeps its
    /// balance-affecting semantics. Anything else unrecognized becomes
    /// `LegacyUntyped`, which is the one accepted "unknown" input.
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("payment") => EntryKind::Payment,
            Some("deposit") => EntryKind::Deposit,
            Some("balance_used") | Some("withdraw") => EntryKind::BalanceUsed,
            Some("refund") => EntryKind::Refund,
            _ => EntryKind::LegacyUntyped,
        }
    }

    /// Whether this entry counts toward an order's paid total (positively).
    pub fn counts_toward_paid(&self) -> bool {
        matches!(
            self,
            EntryKind::Payment | EntryKind::BalanceUsed | EntryKind::LegacyUntyped
        )
    }

    /// Signed effect on the customer's prepaid balance, if any.
    pub fn balance_sign(&self) -> Option<i32> {
        match self {
            EntryKind::Deposit => Some(1),
            EntryKind::BalanceUsed => Some(-1),
            _ => None,
        }
    }

    /// Whether creating or deleting this entry requires a balance
    /// reconciliation pass.
    pub fn affects_balance(&self) -> bool {
        self.balance_sign().is_some()
    }
}

/// An immutable money movement in the ledger.
///
/// Entries belong to a customer and optionally reference one order. They
/// are never edited after creation; the only mutation is deletion, which
/// must re-run balance reconciliation when the entry was balance-affecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: EntryId,
    pub customer_id: CustomerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub payment_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        customer_id: CustomerId,
        order_id: Option<OrderId>,
        amount: Decimal,
        kind: EntryKind,
        payment_date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        LedgerEntry {
            id: EntryId::generate(),
            customer_id,
            order_id,
            amount,
            kind,
            payment_date,
            note,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_withdraw_maps_to_balance_used() {
        assert_eq!(EntryKind::from_db(Some("withdraw")), EntryKind::BalanceUsed);
    }

    #[test]
    fn missing_or_unknown_kind_maps_to_legacy() {
        assert_eq!(EntryKind::from_db(None), EntryKind::LegacyUntyped);
        assert_eq!(EntryKind::from_db(Some("")), EntryKind::LegacyUntyped);
        assert_eq!(EntryKind::from_db(Some("mystery")), EntryKind::LegacyUntyped);
    }

    #[test]
    fn paid_total_membership() {
        assert!(EntryKind::Payment.counts_toward_paid());
        assert!(EntryKind::BalanceUsed.counts_toward_paid());
        assert!(EntryKind::LegacyUntyped.counts_toward_paid());
        assert!(!EntryKind::Deposit.counts_toward_paid());
        assert!(!EntryKind::Refund.counts_toward_paid());
    }

    #[test]
    fn balance_effects() {
        assert_eq!(EntryKind::Deposit.balance_sign(), Some(1));
        assert_eq!(EntryKind::BalanceUsed.balance_sign(), Some(-1));
        assert_eq!(EntryKind::Payment.balance_sign(), None);
        assert_eq!(EntryKind::Refund.balance_sign(), None);
        assert_eq!(EntryKind::LegacyUntyped.balance_sign(), None);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&EntryKind::BalanceUsed).unwrap();
        assert_eq!(json, "\"balance_used\"");
    }
}
