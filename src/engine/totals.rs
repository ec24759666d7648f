//! Ledger summation: delivered, paid, and remaining totals per order.
//!
//! Pure functions over record slices. Summation is commutative, so the
//! totals are independent of insertion order.

use crate::domain::{Decimal, Delivery, EntryKind, LedgerEntry, Order};

/// Total quantity delivered against an order.
pub fn total_delivered(deliveries: &[Delivery]) -> i64 {
    deliveries.iter().map(|d| d.quantity).sum()
}

/// Remaining quantity to deliver. May go negative on over-delivery; the
/// engine reports the raw remainder and leaves display clamping to callers.
pub fn remaining_delivery(order: &Order, deliveries: &[Delivery]) -> i64 {
    order.quantity - total_delivered(deliveries)
}

/// Effective amount paid toward an order.
///
/// Payments, balance-funded payments, and legacy untyped rows count
/// positively; refunds subtract. Deposits never appear here (they are not
/// order-linked money).
pub fn total_paid(entries: &[LedgerEntry]) -> Decimal {
    entries.iter().fold(Decimal::zero(), |acc, e| {
        if e.kind.counts_toward_paid() {
            acc + e.amount
        } else if e.kind == EntryKind::Refund {
            acc - e.amount
        } else {
            acc
        }
    })
}

/// Remaining amount owed on an order. May go negative on over-payment.
pub fn remaining_payment(order: &Order, entries: &[LedgerEntry]) -> Decimal {
    order.final_amount - total_paid(entries)
}

/// Debt contributed by an order: remaining payment clamped at zero.
pub fn order_debt(order: &Order, entries: &[LedgerEntry]) -> Decimal {
    remaining_payment(order, entries).max(Decimal::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, OrderId, OrderStatus};
    use chrono::{NaiveDate, Utc};

    fn order(quantity: i64, final_amount: i64) -> Order {
        Order {
            id: OrderId::generate(),
            customer_id: CustomerId::generate(),
            product: "rice".to_string(),
            quantity,
            unit: "kg".to_string(),
            unit_price: Decimal::from_i64(final_amount / quantity.max(1)),
            discount_percent: Decimal::zero(),
            discount_cash: Decimal::zero(),
            shipping_fee: Decimal::zero(),
            discount_amount: Decimal::zero(),
            final_amount: Decimal::from_i64(final_amount),
            order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: OrderStatus::Pending,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    fn delivery(order_id: OrderId, quantity: i64) -> Delivery {
        Delivery::new(order_id, quantity, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
    }

    fn entry(order: &Order, amount: i64, kind: EntryKind) -> LedgerEntry {
        LedgerEntry::new(
            order.customer_id,
            Some(order.id),
            Decimal::from_i64(amount),
            kind,
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            None,
        )
    }

    #[test]
    fn deliveries_accumulate() {
        let o = order(30, 300_000);
        let ds = vec![delivery(o.id, 10), delivery(o.id, 5)];
        assert_eq!(total_delivered(&ds), 15);
        assert_eq!(remaining_delivery(&o, &ds), 15);
    }

    #[test]
    fn over_delivery_goes_negative() {
        let o = order(10, 100_000);
        let ds = vec![delivery(o.id, 12)];
        assert_eq!(remaining_delivery(&o, &ds), -2);
    }

    #[test]
    fn paid_total_mixes_payment_kinds() {
        let o = order(10, 100_000);
        let es = vec![
            entry(&o, 40_000, EntryKind::Payment),
            entry(&o, 30_000, EntryKind::BalanceUsed),
            entry(&o, 10_000, EntryKind::LegacyUntyped),
        ];
        assert_eq!(total_paid(&es), Decimal::from_i64(80_000));
        assert_eq!(remaining_payment(&o, &es), Decimal::from_i64(20_000));
    }

    #[test]
    fn deposits_do_not_count_toward_paid() {
        let o = order(10, 100_000);
        let es = vec![entry(&o, 100_000, EntryKind::Deposit)];
        assert!(total_paid(&es).is_zero());
    }

    #[test]
    fn refunds_subtract_from_paid() {
        let o = order(10, 100_000);
        let es = vec![
            entry(&o, 100_000, EntryKind::Payment),
            entry(&o, 25_000, EntryKind::Refund),
        ];
        assert_eq!(total_paid(&es), Decimal::from_i64(75_000));
        assert_eq!(order_debt(&o, &es), Decimal::from_i64(25_000));
    }

    #[test]
    fn paid_total_is_commutative() {
        let o = order(10, 100_000);
        let mut es = vec![
            entry(&o, 10_000, EntryKind::Payment),
            entry(&o, 5_000, EntryKind::Refund),
            entry(&o, 20_000, EntryKind::BalanceUsed),
        ];
        let forward = total_paid(&es);
        es.reverse();
        assert_eq!(total_paid(&es), forward);
    }

    #[test]
    fn over_payment_yields_zero_debt() {
        let o = order(10, 100_000);
        let es = vec![entry(&o, 120_000, EntryKind::Payment)];
        assert_eq!(remaining_payment(&o, &es), Decimal::from_i64(-20_000));
        assert!(order_debt(&o, &es).is_zero());
    }
}
