//! Aggregation and alert engine.
//!
//! Pure functions of a snapshot of all orders/customers; no stored state.
//! Invoked per dashboard render, not per mutation. Alert dismissal is
//! caller-local and never persisted here.

use crate::config::AlertThresholds;
use crate::domain::{Customer, CustomerId, Decimal, Delivery, EntryKind, LedgerEntry, Order, OrderId};
use crate::engine::totals;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// One order together with its delivery and payment records.
#[derive(Debug, Clone)]
pub struct OrderRecords {
    pub order: Order,
    pub deliveries: Vec<Delivery>,
    pub payments: Vec<LedgerEntry>,
}

/// A point-in-time view of the whole ledger.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub customers: Vec<Customer>,
    pub orders: Vec<OrderRecords>,
    /// Every ledger entry, order-linked or not (deposits included).
    pub entries: Vec<LedgerEntry>,
}

/// Cross-order/cross-customer report numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub total_debt: Decimal,
    pub debtor_count: i64,
    pub need_delivery_count: i64,
    pub pending_count: i64,
    /// Money actually received: payments + deposits (legacy rows included).
    pub total_revenue: Decimal,
}

/// Per-customer rollup for the customer list view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    #[serde(flatten)]
    pub customer: Customer,
    pub order_count: i64,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub debt: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Delivery,
    Payment,
    Birthday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// A time-threshold alert condition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub customer_id: CustomerId,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Delivery/payment: days past the threshold. Birthday: days until the
    /// next occurrence, negated (so larger still means more urgent).
    pub days_overdue: i64,
}

/// Compute global debt/backlog aggregates from a snapshot.
pub fn compute_aggregates(snapshot: &LedgerSnapshot) -> Aggregates {
    let mut total_debt = Decimal::zero();
    let mut debtors: HashSet<CustomerId> = HashSet::new();
    let mut need_delivery_count = 0i64;
    let mut pending_count = 0i64;

    for rec in &snapshot.orders {
        if rec.order.is_completed() {
            continue;
        }
        pending_count += 1;

        if totals::total_delivered(&rec.deliveries) < rec.order.quantity {
            need_delivery_count += 1;
        }

        let debt = totals::order_debt(&rec.order, &rec.payments);
        if debt.is_positive() {
            total_debt = total_debt + debt;
            debtors.insert(rec.order.customer_id);
        }
    }

    let total_revenue = snapshot
        .entries
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EntryKind::Payment | EntryKind::Deposit | EntryKind::LegacyUntyped
            )
        })
        .fold(Decimal::zero(), |acc, e| acc + e.amount);

    Aggregates {
        total_debt,
        debtor_count: debtors.len() as i64,
        need_delivery_count,
        pending_count,
        total_revenue,
    }
}

/// Roll up order counts, amounts, and debt per customer.
pub fn compute_customer_stats(snapshot: &LedgerSnapshot) -> Vec<CustomerStats> {
    snapshot
        .customers
        .iter()
        .map(|customer| {
            let mut order_count = 0i64;
            let mut total_amount = Decimal::zero();
            let mut total_paid = Decimal::zero();
            for rec in &snapshot.orders {
                if rec.order.customer_id != customer.id {
                    continue;
                }
                order_count += 1;
                total_amount = total_amount + rec.order.final_amount;
                total_paid = total_paid + totals::total_paid(&rec.payments);
            }
            CustomerStats {
                customer: customer.clone(),
                order_count,
                total_amount,
                total_paid,
                debt: (total_amount - total_paid).max(Decimal::zero()),
            }
        })
        .collect()
}

/// Generate and rank alerts for the given day.
pub fn compute_alerts(
    snapshot: &LedgerSnapshot,
    thresholds: &AlertThresholds,
    today: NaiveDate,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for rec in &snapshot.orders {
        if rec.order.is_completed() {
            continue;
        }
        let customer_name = snapshot
            .customers
            .iter()
            .find(|c| c.id == rec.order.customer_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let days_since_order = (today - rec.order.order_date).num_days();

        if totals::remaining_delivery(&rec.order, &rec.deliveries) > 0
            && days_since_order >= thresholds.delivery_alert_days
        {
            alerts.push(Alert {
                kind: AlertKind::Delivery,
                severity: overdue_severity(days_since_order, thresholds.delivery_alert_days),
                customer_id: rec.order.customer_id,
                customer_name: customer_name.clone(),
                order_id: Some(rec.order.id),
                product: Some(rec.order.product.clone()),
                days_overdue: days_since_order - thresholds.delivery_alert_days,
            });
        }

        if totals::remaining_payment(&rec.order, &rec.payments).is_positive()
            && days_since_order >= thresholds.payment_alert_days
        {
            alerts.push(Alert {
                kind: AlertKind::Payment,
                severity: overdue_severity(days_since_order, thresholds.payment_alert_days),
                customer_id: rec.order.customer_id,
                customer_name,
                order_id: Some(rec.order.id),
                product: Some(rec.order.product.clone()),
                days_overdue: days_since_order - thresholds.payment_alert_days,
            });
        }
    }

    for customer in &snapshot.customers {
        let Some(birthday) = customer.birthday else {
            continue;
        };
        let Some(days_until) = days_until_birthday(birthday, today) else {
            continue;
        };
        if days_until <= thresholds.birthday_alert_days {
            alerts.push(Alert {
                kind: AlertKind::Birthday,
                severity: if days_until <= 1 {
                    Severity::High
                } else {
                    Severity::Low
                },
                customer_id: customer.id,
                customer_name: customer.name.clone(),
                order_id: None,
                product: None,
                days_overdue: -days_until,
            });
        }
    }

    sort_alerts(&mut alerts);
    alerts
}

fn overdue_severity(days_since_order: i64, threshold_days: i64) -> Severity {
    if days_since_order >= threshold_days * 2 {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Days until the next occurrence of a birthday, wrapping year-end.
///
/// Feb 29 birthdays fall on Mar 1 in non-leap years.
fn days_until_birthday(birthday: NaiveDate, today: NaiveDate) -> Option<i64> {
    use chrono::Datelike;

    let occurrence_in = |year: i32| {
        NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
    };

    let this_year = occurrence_in(today.year())?;
    let next = if this_year < today {
        occurrence_in(today.year() + 1)?
    } else {
        this_year
    };
    Some((next - today).num_days())
}

/// Rank alerts for display.
///
/// High-severity birthdays come first; other birthdays sink to the bottom.
/// Everything in between sorts high before medium, then by days overdue
/// descending.
fn sort_alerts(alerts: &mut [Alert]) {
    fn bucket(a: &Alert) -> u8 {
        match (a.kind, a.severity) {
            (AlertKind::Birthday, Severity::High) => 0,
            (AlertKind::Birthday, _) => 2,
            _ => 1,
        }
    }
    fn severity_rank(s: Severity) -> u8 {
        match s {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    alerts.sort_by(|a, b| {
        bucket(a)
            .cmp(&bucket(b))
            .then_with(|| severity_rank(a.severity).cmp(&severity_rank(b.severity)))
            .then_with(|| b.days_overdue.cmp(&a.days_overdue))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use chrono::Utc;

    fn customer(name: &str, birthday: Option<NaiveDate>) -> Customer {
        Customer {
            id: CustomerId::generate(),
            name: name.to_string(),
            phone: None,
            balance: Decimal::zero(),
            discount_percent: Decimal::zero(),
            birthday,
            created_at: Utc::now(),
        }
    }

    fn order_for(
        customer: &Customer,
        final_amount: i64,
        order_date: NaiveDate,
        status: OrderStatus,
    ) -> Order {
        Order {
            id: OrderId::generate(),
            customer_id: customer.id,
            product: "tea".to_string(),
            quantity: 10,
            unit: "box".to_string(),
            unit_price: Decimal::from_i64(final_amount / 10),
            discount_percent: Decimal::zero(),
            discount_cash: Decimal::zero(),
            shipping_fee: Decimal::zero(),
            discount_amount: Decimal::zero(),
            final_amount: Decimal::from_i64(final_amount),
            order_date,
            status,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    fn payment_for(order: &Order, amount: i64) -> LedgerEntry {
        LedgerEntry::new(
            order.customer_id,
            Some(order.id),
            Decimal::from_i64(amount),
            EntryKind::Payment,
            order.order_date,
            None,
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn aggregates_debt_and_debtors() {
        let a = customer("An", None);
        let b = customer("Binh", None);
        let date = day(2024, 5, 1);
        let o1 = order_for(&a, 100_000, date, OrderStatus::Pending);
        let o2 = order_for(&b, 200_000, date, OrderStatus::Pending);
        let p2 = payment_for(&o2, 200_000);

        let snapshot = LedgerSnapshot {
            customers: vec![a, b],
            orders: vec![
                OrderRecords {
                    order: o1,
                    deliveries: vec![],
                    payments: vec![],
                },
                OrderRecords {
                    order: o2,
                    deliveries: vec![],
                    payments: vec![p2.clone()],
                },
            ],
            entries: vec![p2],
        };

        let agg = compute_aggregates(&snapshot);
        assert_eq!(agg.total_debt, Decimal::from_i64(100_000));
        assert_eq!(agg.debtor_count, 1);
        assert_eq!(agg.need_delivery_count, 2);
        assert_eq!(agg.pending_count, 2);
        assert_eq!(agg.total_revenue, Decimal::from_i64(200_000));
    }

    #[test]
    fn completed_orders_carry_no_debt() {
        let a = customer("An", None);
        let o = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Completed);
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![],
            }],
            entries: vec![],
        };
        let agg = compute_aggregates(&snapshot);
        assert!(agg.total_debt.is_zero());
        assert_eq!(agg.debtor_count, 0);
        assert_eq!(agg.pending_count, 0);
    }

    #[test]
    fn revenue_counts_deposits_and_legacy_rows() {
        let a = customer("An", None);
        let deposit = LedgerEntry::new(
            a.id,
            None,
            Decimal::from_i64(300_000),
            EntryKind::Deposit,
            day(2024, 5, 1),
            None,
        );
        let legacy = LedgerEntry::new(
            a.id,
            None,
            Decimal::from_i64(50_000),
            EntryKind::LegacyUntyped,
            day(2024, 5, 1),
            None,
        );
        let refund = LedgerEntry::new(
            a.id,
            None,
            Decimal::from_i64(10_000),
            EntryKind::Refund,
            day(2024, 5, 1),
            None,
        );
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![],
            entries: vec![deposit, legacy, refund],
        };
        let agg = compute_aggregates(&snapshot);
        assert_eq!(agg.total_revenue, Decimal::from_i64(350_000));
    }

    #[test]
    fn customer_stats_rollup() {
        let a = customer("An", None);
        let o = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let p = payment_for(&o, 40_000);
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![p.clone()],
            }],
            entries: vec![p],
        };
        let stats = compute_customer_stats(&snapshot);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].order_count, 1);
        assert_eq!(stats[0].total_amount, Decimal::from_i64(100_000));
        assert_eq!(stats[0].total_paid, Decimal::from_i64(40_000));
        assert_eq!(stats[0].debt, Decimal::from_i64(60_000));
    }

    #[test]
    fn delivery_alert_goes_high_at_double_threshold() {
        let a = customer("An", None);
        let today = day(2024, 5, 11);
        // Placed 10 days ago, threshold 3: 10 >= 6 so high.
        let o = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![],
            }],
            entries: vec![],
        };
        let thresholds = AlertThresholds {
            delivery_alert_days: 3,
            payment_alert_days: 100,
            birthday_alert_days: 0,
        };
        let alerts = compute_alerts(&snapshot, &thresholds, today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Delivery);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].days_overdue, 7);
    }

    #[test]
    fn fully_delivered_order_emits_no_delivery_alert() {
        let a = customer("An", None);
        let o = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let d = Delivery::new(o.id, 10, day(2024, 5, 2));
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![d],
                payments: vec![],
            }],
            entries: vec![],
        };
        let thresholds = AlertThresholds {
            delivery_alert_days: 3,
            payment_alert_days: 100,
            birthday_alert_days: 0,
        };
        let alerts = compute_alerts(&snapshot, &thresholds, day(2024, 5, 20));
        assert!(alerts.is_empty());
    }

    #[test]
    fn payment_alert_medium_below_double_threshold() {
        let a = customer("An", None);
        let o = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let snapshot = LedgerSnapshot {
            customers: vec![a],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![],
            }],
            entries: vec![],
        };
        let thresholds = AlertThresholds {
            delivery_alert_days: 100,
            payment_alert_days: 7,
            birthday_alert_days: 0,
        };
        // 8 days since order: >= 7 but < 14.
        let alerts = compute_alerts(&snapshot, &thresholds, day(2024, 5, 9));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Payment);
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn birthday_today_is_high_and_sorts_first() {
        let today = day(2024, 6, 10);
        let birthday_customer = customer("Chi", Some(day(1990, 6, 10)));
        let debtor = customer("An", None);
        let o = order_for(&debtor, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let snapshot = LedgerSnapshot {
            customers: vec![birthday_customer, debtor],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![],
            }],
            entries: vec![],
        };
        let thresholds = AlertThresholds::default();
        let alerts = compute_alerts(&snapshot, &thresholds, today);
        assert!(alerts.len() >= 2);
        assert_eq!(alerts[0].kind, AlertKind::Birthday);
        assert_eq!(alerts[0].severity, Severity::High);
    }

    #[test]
    fn low_birthday_sorts_last() {
        let today = day(2024, 6, 10);
        let birthday_customer = customer("Chi", Some(day(1990, 6, 15)));
        let debtor = customer("An", None);
        let o = order_for(&debtor, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let snapshot = LedgerSnapshot {
            customers: vec![birthday_customer, debtor],
            orders: vec![OrderRecords {
                order: o,
                deliveries: vec![],
                payments: vec![],
            }],
            entries: vec![],
        };
        let alerts = compute_alerts(&snapshot, &AlertThresholds::default(), today);
        let last = alerts.last().unwrap();
        assert_eq!(last.kind, AlertKind::Birthday);
        assert_eq!(last.severity, Severity::Low);
    }

    #[test]
    fn birthday_wraps_year_end() {
        // Birthday Jan 2, today Dec 30: 3 days away across the year boundary.
        let today = day(2024, 12, 30);
        let c = customer("Chi", Some(day(1985, 1, 2)));
        let snapshot = LedgerSnapshot {
            customers: vec![c],
            orders: vec![],
            entries: vec![],
        };
        let thresholds = AlertThresholds {
            delivery_alert_days: 3,
            payment_alert_days: 7,
            birthday_alert_days: 7,
        };
        let alerts = compute_alerts(&snapshot, &thresholds, today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Birthday);
        assert_eq!(alerts[0].severity, Severity::Low);
        assert_eq!(alerts[0].days_overdue, -3);
    }

    #[test]
    fn equal_severity_sorts_by_days_overdue_desc() {
        let a = customer("An", None);
        let b = customer("Binh", None);
        // Both high: placed 30 and 20 days before today, threshold 3.
        let o1 = order_for(&a, 100_000, day(2024, 5, 1), OrderStatus::Pending);
        let o2 = order_for(&b, 100_000, day(2024, 5, 11), OrderStatus::Pending);
        let snapshot = LedgerSnapshot {
            customers: vec![a, b],
            orders: vec![
                OrderRecords {
                    order: o2.clone(),
                    deliveries: vec![],
                    payments: vec![],
                },
                OrderRecords {
                    order: o1.clone(),
                    deliveries: vec![],
                    payments: vec![],
                },
            ],
            entries: vec![],
        };
        let thresholds = AlertThresholds {
            delivery_alert_days: 3,
            payment_alert_days: 1000,
            birthday_alert_days: 0,
        };
        let alerts = compute_alerts(&snapshot, &thresholds, day(2024, 5, 31));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].order_id, Some(o1.id));
        assert_eq!(alerts[1].order_id, Some(o2.id));
        assert!(alerts[0].days_overdue > alerts[1].days_overdue);
    }
}
