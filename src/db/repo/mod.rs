//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database access.
//! Methods are organized across submodules by resource:
//! - `customers.rs` - customer records
//! - `products.rs` - product templates
//! - `orders.rs` - order records and status updates
//! - `ledger.rs` - deliveries, payments, and balance reconciliation
//!
//! Monetary amounts are stored as canonical decimal strings and dates as
//! ISO-8601 text; decoding happens here, once, with suspect rows logged.

mod customers;
mod ledger;
mod orders;
mod products;

use crate::domain::{Decimal, LedgerEntry};
use crate::engine::{LedgerSnapshot, OrderRecords};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial query; backs the readiness endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Load a point-in-time view of the entire ledger for reporting.
    ///
    /// O(total records); intended for dashboard/report renders, not per
    /// mutation.
    pub async fn load_snapshot(&self) -> Result<LedgerSnapshot, sqlx::Error> {
        let customers = self.list_customers().await?;
        let orders = self.list_orders().await?;
        let deliveries = self.list_deliveries().await?;
        let entries = self.list_entries().await?;

        let mut deliveries_by_order: HashMap<_, Vec<_>> = HashMap::new();
        for d in deliveries {
            deliveries_by_order.entry(d.order_id).or_default().push(d);
        }
        let mut payments_by_order: HashMap<_, Vec<LedgerEntry>> = HashMap::new();
        for e in &entries {
            if let Some(order_id) = e.order_id {
                payments_by_order
                    .entry(order_id)
                    .or_default()
                    .push(e.clone());
            }
        }

        let orders = orders
            .into_iter()
            .map(|order| {
                let deliveries = deliveries_by_order.remove(&order.id).unwrap_or_default();
                let payments = payments_by_order.remove(&order.id).unwrap_or_default();
                OrderRecords {
                    order,
                    deliveries,
                    payments,
                }
            })
            .collect();

        Ok(LedgerSnapshot {
            customers,
            orders,
            entries,
        })
    }

    /// Load one order with its deliveries and payments.
    pub async fn load_order_records(
        &self,
        order_id: crate::domain::OrderId,
    ) -> Result<Option<OrderRecords>, sqlx::Error> {
        let Some(order) = self.get_order(order_id).await? else {
            return Ok(None);
        };
        let deliveries = self.list_deliveries_for_order(order_id).await?;
        let payments = self.list_entries_for_order(order_id).await?;
        Ok(Some(OrderRecords {
            order,
            deliveries,
            payments,
        }))
    }
}

// =============================================================================
// Row decode helpers
// =============================================================================

pub(super) fn decode_decimal(raw: &str, context: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or_else(|e| {
        warn!(context, raw, "failed to parse stored decimal: {}", e);
        Decimal::zero()
    })
}

pub(super) fn decode_uuid(raw: &str, context: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|e| {
        warn!(context, raw, "failed to parse stored uuid: {}", e);
        Uuid::nil()
    })
}

pub(super) fn decode_date(raw: &str, context: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|e| {
        warn!(context, raw, "failed to parse stored date: {}", e);
        NaiveDate::default()
    })
}

pub(super) fn decode_datetime(raw: &str, context: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!(context, raw, "failed to parse stored timestamp: {}", e);
            DateTime::<Utc>::UNIX_EPOCH
        })
}

pub(super) fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(super) fn encode_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_decimal_falls_back_to_zero() {
        assert_eq!(decode_decimal("garbage", "test"), Decimal::zero());
        assert_eq!(decode_decimal("123.45", "test").to_canonical_string(), "123.45");
    }

    #[test]
    fn date_roundtrip() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(decode_date(&encode_date(d), "test"), d);
    }

    #[test]
    fn datetime_roundtrip() {
        let now = Utc::now();
        let decoded = decode_datetime(&encode_datetime(now), "test");
        assert_eq!(decoded.timestamp_millis(), now.timestamp_millis());
    }
}
