//! Delivery record.

use crate::domain::{DeliveryId, OrderId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A partial (or full) delivery against an order.
///
/// Deliveries accumulate; the engine reports the remainder against the
/// order quantity but does not forbid over-delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub order_id: OrderId,
    pub quantity: i64,
    pub delivery_date: NaiveDate,
}

impl Delivery {
    pub fn new(order_id: OrderId, quantity: i64, delivery_date: NaiveDate) -> Self {
        Delivery {
            id: DeliveryId::generate(),
            order_id,
            quantity,
            delivery_date,
        }
    }
}
