//! Ledger command service.
//!
//! Single entry point for every ledger mutation. Responsibilities:
//! - validate inputs and reject before any write
//! - materialize order pricing on create/update
//! - serialize check-then-write-then-reconcile per customer, so two
//!   balance-funded payments cannot both pass the insufficient-balance
//!   check and overspend the balance
//! - run the completion state machine after every delivery/payment mutation

use crate::domain::{
    Customer, CustomerId, Decimal, Delivery, DeliveryId, EntryId, EntryKind, LedgerEntry, Order,
    OrderId, OrderStatus,
};
use crate::db::Repository;
use crate::engine::{balance, completion, pricing};
use crate::error::AppError;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A new order command. `discount_percent: None` falls back to the
/// customer's default discount.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product: String,
    pub quantity: i64,
    pub unit: String,
    pub unit_price: Decimal,
    pub discount_percent: Option<Decimal>,
    pub discount_cash: Decimal,
    pub shipping_fee: Decimal,
    pub order_date: NaiveDate,
}

/// Partial pricing/metadata update for an order. `None` keeps the stored
/// value; any present pricing field forces a full re-materialization.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub discount_cash: Option<Decimal>,
    pub shipping_fee: Option<Decimal>,
    pub order_date: Option<NaiveDate>,
}

pub struct LedgerService {
    repo: Arc<Repository>,
    /// One async mutex per customer guarding balance-affecting sequences.
    customer_locks: Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>,
}

impl LedgerService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            customer_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn customer_lock(&self, id: CustomerId) -> Arc<Mutex<()>> {
        let mut locks = self.customer_locks.lock().await;
        locks.entry(id).or_insert_with(Default::default).clone()
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create one or more orders in a single batch (the multi-product
    /// checkout flow sends several). Every order is validated before any
    /// row is written.
    pub async fn create_orders(&self, cmds: Vec<NewOrder>) -> Result<Vec<Order>, AppError> {
        let mut orders = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            let customer = self.require_customer(cmd.customer_id).await?;
            orders.push(build_order(&customer, cmd)?);
        }
        match orders.as_slice() {
            [order] => self.repo.insert_order(order).await?,
            _ => self.repo.insert_orders_batch(&orders).await?,
        }
        Ok(orders)
    }

    /// Apply a partial update; pricing is re-materialized from the merged
    /// inputs so `final_amount` stays consistent for every reader.
    pub async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Order, AppError> {
        let mut order = self.require_order(id).await?;

        if let Some(product) = update.product {
            order.product = product;
        }
        if let Some(unit) = update.unit {
            order.unit = unit;
        }
        if let Some(order_date) = update.order_date {
            order.order_date = order_date;
        }
        if let Some(quantity) = update.quantity {
            order.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            order.unit_price = unit_price;
        }
        if let Some(discount_percent) = update.discount_percent {
            order.discount_percent = discount_percent;
        }
        if let Some(discount_cash) = update.discount_cash {
            order.discount_cash = discount_cash;
        }
        if let Some(shipping_fee) = update.shipping_fee {
            order.shipping_fee = shipping_fee;
        }

        let pricing = pricing::compute_final_amount(&pricing::PricingInputs {
            quantity: order.quantity,
            unit_price: order.unit_price,
            discount_percent: order.discount_percent,
            discount_cash: order.discount_cash,
            shipping_fee: order.shipping_fee,
        })?;
        order.discount_amount = pricing.discount_amount;
        order.final_amount = pricing.final_amount;

        self.repo.update_order(&order).await?;
        Ok(order)
    }

    /// Delete an order and its child records. Never touches customer
    /// balance: only deposit/balance_used mutations move it.
    pub async fn delete_order(&self, id: OrderId) -> Result<(), AppError> {
        if !self.repo.delete_order(id).await? {
            return Err(AppError::NotFound(format!("order {}", id)));
        }
        Ok(())
    }

    /// Explicit completed -> pending transition.
    pub async fn reopen_order(&self, id: OrderId) -> Result<Order, AppError> {
        let order = self.require_order(id).await?;
        if order.status != OrderStatus::Completed {
            return Err(AppError::BadRequest(format!(
                "order {} is not completed",
                id
            )));
        }
        self.repo.reopen_order(id).await?;
        self.require_order(id).await
    }

    /// Maintenance sweep: drop completed orders older than `days_old` days.
    pub async fn cleanup_old_orders(&self, days_old: i64) -> Result<u64, AppError> {
        if days_old <= 0 {
            return Err(AppError::validation(
                "days_old",
                "must be greater than zero",
            ));
        }
        let cutoff = Utc::now().date_naive() - Duration::days(days_old);
        Ok(self.repo.delete_completed_before(cutoff).await?)
    }

    // =========================================================================
    // Deliveries
    // =========================================================================

    pub async fn add_delivery(
        &self,
        order_id: OrderId,
        quantity: i64,
        delivery_date: NaiveDate,
    ) -> Result<(Delivery, Order), AppError> {
        if quantity <= 0 {
            return Err(AppError::validation(
                "quantity",
                "must be greater than zero",
            ));
        }
        self.require_order(order_id).await?;

        let delivery = Delivery::new(order_id, quantity, delivery_date);
        self.repo.insert_delivery(&delivery).await?;

        let order = self.evaluate_completion(order_id).await?;
        Ok((delivery, order))
    }

    /// Deleting a delivery never auto-reverts a completed order; reopening
    /// is an explicit command.
    pub async fn delete_delivery(&self, id: DeliveryId) -> Result<(), AppError> {
        if !self.repo.delete_delivery(id).await? {
            return Err(AppError::NotFound(format!("delivery {}", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Payments and deposits
    // =========================================================================

    /// Record a direct payment (or refund) against an order. When the
    /// customer is not given it is inferred from the order.
    pub async fn record_payment(
        &self,
        customer_id: Option<CustomerId>,
        order_id: OrderId,
        amount: Decimal,
        kind: EntryKind,
        payment_date: NaiveDate,
        note: Option<String>,
    ) -> Result<(LedgerEntry, Order), AppError> {
        if !matches!(kind, EntryKind::Payment | EntryKind::Refund) {
            return Err(AppError::BadRequest(
                "kind must be payment or refund; use the deposit/balance endpoints otherwise"
                    .to_string(),
            ));
        }
        require_positive_amount(amount)?;

        let order = self.require_order(order_id).await?;
        let customer_id = customer_id.unwrap_or(order.customer_id);
        if customer_id != order.customer_id {
            return Err(AppError::BadRequest(format!(
                "order {} does not belong to customer {}",
                order_id, customer_id
            )));
        }

        let entry = LedgerEntry::new(
            customer_id,
            Some(order_id),
            amount,
            kind,
            payment_date,
            note,
        );
        self.repo.insert_entry(&entry).await?;

        let order = self.evaluate_completion(order_id).await?;
        Ok((entry, order))
    }

    /// Customer pre-funds their account. Reconciles balance synchronously;
    /// the returned balance is never stale for the next read.
    pub async fn record_deposit(
        &self,
        customer_id: CustomerId,
        amount: Decimal,
        payment_date: NaiveDate,
        note: Option<String>,
    ) -> Result<(LedgerEntry, Decimal), AppError> {
        require_positive_amount(amount)?;
        self.require_customer(customer_id).await?;

        let lock = self.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let entry = LedgerEntry::new(
            customer_id,
            None,
            amount,
            EntryKind::Deposit,
            payment_date,
            note,
        );
        let balance = self.repo.insert_entry_reconciled(&entry).await?;
        Ok((entry, balance))
    }

    /// Spend prepaid balance, optionally against an order. The insufficient
    /// -balance check, the write, and the reconcile run under the customer's
    /// lock so concurrent spends cannot both pass the check.
    pub async fn pay_from_balance(
        &self,
        customer_id: Option<CustomerId>,
        order_id: Option<OrderId>,
        amount: Decimal,
        payment_date: NaiveDate,
        note: Option<String>,
    ) -> Result<(LedgerEntry, Decimal, Option<Order>), AppError> {
        require_positive_amount(amount)?;

        let customer_id = match (customer_id, order_id) {
            (Some(c), _) => c,
            (None, Some(o)) => self.require_order(o).await?.customer_id,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "either customerId or orderId is required".to_string(),
                ))
            }
        };
        if let Some(order_id) = order_id {
            let order = self.require_order(order_id).await?;
            if order.customer_id != customer_id {
                return Err(AppError::BadRequest(format!(
                    "order {} does not belong to customer {}",
                    order_id, customer_id
                )));
            }
        }

        let lock = self.customer_lock(customer_id).await;
        let _guard = lock.lock().await;
        let customer = self.require_customer(customer_id).await?;

        // Authoritative balance is the ledger recompute; the cached column
        // must agree or the reconciler invariant has been violated.
        let entries = self.repo.list_entries_for_customer(customer_id).await?;
        let current = balance::recompute_balance(&entries);
        if current != customer.balance {
            return Err(AppError::InconsistentState(format!(
                "customer {} cached balance {} disagrees with ledger recompute {}",
                customer_id, customer.balance, current
            )));
        }
        if amount > current {
            return Err(AppError::InsufficientBalance {
                requested: amount,
                available: current,
            });
        }

        let entry = LedgerEntry::new(
            customer_id,
            order_id,
            amount,
            EntryKind::BalanceUsed,
            payment_date,
            note,
        );
        let new_balance = self.repo.insert_entry_reconciled(&entry).await?;

        let order = match order_id {
            Some(id) => Some(self.evaluate_completion(id).await?),
            None => None,
        };
        Ok((entry, new_balance, order))
    }

    /// Delete a ledger entry. Balance-affecting entries reconcile in the
    /// same transaction; completed orders are never auto-reverted.
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), AppError> {
        let entry = self
            .repo
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {}", id)))?;

        if entry.kind.affects_balance() {
            let lock = self.customer_lock(entry.customer_id).await;
            let _guard = lock.lock().await;
            self.repo.delete_entry_reconciled(&entry).await?;
        } else {
            self.repo.delete_entry_reconciled(&entry).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Evaluate the auto-complete condition after a delivery/payment
    /// mutation and persist the transition when it fires.
    async fn evaluate_completion(&self, order_id: OrderId) -> Result<Order, AppError> {
        let records = self
            .repo
            .load_order_records(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;

        if completion::should_complete(&records.order, &records.deliveries, &records.payments) {
            self.repo.mark_completed(order_id, Utc::now()).await?;
        }
        self.require_order(order_id).await
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    async fn require_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        self.repo
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))
    }

    async fn require_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.repo
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", id)))
    }
}

fn build_order(customer: &Customer, cmd: NewOrder) -> Result<Order, AppError> {
    let discount_percent = cmd.discount_percent.unwrap_or(customer.discount_percent);
    let pricing = pricing::compute_final_amount(&pricing::PricingInputs {
        quantity: cmd.quantity,
        unit_price: cmd.unit_price,
        discount_percent,
        discount_cash: cmd.discount_cash,
        shipping_fee: cmd.shipping_fee,
    })?;

    Ok(Order {
        id: OrderId::generate(),
        customer_id: cmd.customer_id,
        product: cmd.product,
        quantity: cmd.quantity,
        unit: cmd.unit,
        unit_price: cmd.unit_price,
        discount_percent,
        discount_cash: cmd.discount_cash,
        shipping_fee: cmd.shipping_fee,
        discount_amount: pricing.discount_amount,
        final_amount: pricing.final_amount,
        order_date: cmd.order_date,
        status: OrderStatus::Pending,
        completed_at: None,
        created_at: Utc::now(),
    })
}

fn require_positive_amount(amount: Decimal) -> Result<(), AppError> {
    if !amount.is_positive() {
        return Err(AppError::validation(
            "amount",
            "must be greater than zero",
        ));
    }
    Ok(())
}
