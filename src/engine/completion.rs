//! Order completion state machine.
//!
//! An order auto-completes the moment it is both fully delivered and fully
//! paid, evaluated after every delivery/payment mutation. The reverse
//! transition is explicit only: deleting records never flips a completed
//! order back to pending.

use crate::domain::{Delivery, LedgerEntry, Order};
use crate::engine::totals;

/// Decide whether a delivery/payment mutation completes the order.
///
/// Returns true when a pending order has reached both completion
/// conditions. A completed order always returns false; adding further
/// records to it has no effect on status.
pub fn should_complete(order: &Order, deliveries: &[Delivery], entries: &[LedgerEntry]) -> bool {
    if order.is_completed() {
        return false;
    }
    totals::total_delivered(deliveries) >= order.quantity
        && totals::total_paid(entries) >= order.final_amount
}
