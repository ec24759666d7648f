//! Order record and lifecycle status.

use crate::domain::{CustomerId, Decimal, OrderId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// `Pending -> Completed` happens automatically when an order is both
/// fully delivered and fully paid; `Completed -> Pending` only by an
/// explicit reopen. No other transitions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
        }
    }

    /// Decode a stored status string. Unknown values fall back to pending.
    pub fn from_db(s: &str) -> Self {
        match s {
            "completed" => OrderStatus::Completed,
            _ => OrderStatus::Pending,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single-product order for one customer.
///
/// `discount_amount` and `final_amount` are materialized views of the
/// pricing inputs: they are recomputed and persisted transactionally
/// whenever any pricing input changes, so every reader sees the same
/// authoritative amount owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product: String,
    pub quantity: i64,
    pub unit: String,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_cash: Decimal,
    pub shipping_fee: Decimal,
    /// Materialized: gross_amount * discount_percent / 100.
    pub discount_amount: Decimal,
    /// Materialized: gross - discount_amount - discount_cash + shipping_fee.
    pub final_amount: Decimal,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Gross amount before any discount or shipping adjustment.
    pub fn gross_amount(&self) -> Decimal {
        self.unit_price * Decimal::from_i64(self.quantity)
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_form() {
        assert_eq!(OrderStatus::from_db("completed"), OrderStatus::Completed);
        assert_eq!(OrderStatus::from_db("pending"), OrderStatus::Pending);
        assert_eq!(OrderStatus::from_db(""), OrderStatus::Pending);
        assert_eq!(OrderStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
