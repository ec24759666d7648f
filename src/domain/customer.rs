//! Customer record.

use crate::domain::{CustomerId, Decimal};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A customer with a prepaid account balance.
///
/// `balance` is derived from the payment ledger and written only by the
/// balance reconciler; it is never authored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Prepaid account balance, maintained by full recompute from the ledger.
    pub balance: Decimal,
    /// Default percentage discount applied to this customer's new orders.
    pub discount_percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer with a zero balance.
    pub fn new(
        name: String,
        phone: Option<String>,
        discount_percent: Decimal,
        birthday: Option<NaiveDate>,
    ) -> Self {
        Customer {
            id: CustomerId::generate(),
            name,
            phone,
            balance: Decimal::zero(),
            discount_percent,
            birthday,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_customer_starts_with_zero_balance() {
        let c = Customer::new("Chi Lan".to_string(), None, Decimal::from_i64(5), None);
        assert!(c.balance.is_zero());
        assert_eq!(c.discount_percent, Decimal::from_i64(5));
    }
}
