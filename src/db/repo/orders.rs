//! Order operations for the repository.

use crate::domain::{CustomerId, Order, OrderId, OrderStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    decode_date, decode_datetime, decode_decimal, decode_uuid, encode_date, encode_datetime,
    Repository,
};

impl Repository {
    pub async fn insert_order(&self, order: &Order) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, product, quantity, unit, unit_price,
                discount_percent, discount_cash, shipping_fee,
                discount_amount, final_amount, order_date, status,
                completed_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(order.customer_id.to_string())
        .bind(&order.product)
        .bind(order.quantity)
        .bind(&order.unit)
        .bind(order.unit_price.to_canonical_string())
        .bind(order.discount_percent.to_canonical_string())
        .bind(order.discount_cash.to_canonical_string())
        .bind(order.shipping_fee.to_canonical_string())
        .bind(order.discount_amount.to_canonical_string())
        .bind(order.final_amount.to_canonical_string())
        .bind(encode_date(order.order_date))
        .bind(order.status.as_str())
        .bind(order.completed_at.map(encode_datetime))
        .bind(encode_datetime(order.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert several orders in one transaction (multi-product checkout).
    pub async fn insert_orders_batch(&self, orders: &[Order]) -> Result<(), sqlx::Error> {
        if orders.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for order in orders {
            sqlx::query(
                r#"
                INSERT INTO orders (
                    id, customer_id, product, quantity, unit, unit_price,
                    discount_percent, discount_cash, shipping_fee,
                    discount_amount, final_amount, order_date, status,
                    completed_at, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(order.id.to_string())
            .bind(order.customer_id.to_string())
            .bind(&order.product)
            .bind(order.quantity)
            .bind(&order.unit)
            .bind(order.unit_price.to_canonical_string())
            .bind(order.discount_percent.to_canonical_string())
            .bind(order.discount_cash.to_canonical_string())
            .bind(order.shipping_fee.to_canonical_string())
            .bind(order.discount_amount.to_canonical_string())
            .bind(order.final_amount.to_canonical_string())
            .bind(encode_date(order.order_date))
            .bind(order.status.as_str())
            .bind(order.completed_at.map(encode_datetime))
            .bind(encode_datetime(order.created_at))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| order_from_row(&r)))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(order_from_row).collect())
    }

    /// Persist an order's mutable fields, including the re-materialized
    /// pricing. Callers must have recomputed pricing before this write.
    pub async fn update_order(&self, order: &Order) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET product = ?, quantity = ?, unit = ?, unit_price = ?,
                discount_percent = ?, discount_cash = ?, shipping_fee = ?,
                discount_amount = ?, final_amount = ?, order_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&order.product)
        .bind(order.quantity)
        .bind(&order.unit)
        .bind(order.unit_price.to_canonical_string())
        .bind(order.discount_percent.to_canonical_string())
        .bind(order.discount_cash.to_canonical_string())
        .bind(order.shipping_fee.to_canonical_string())
        .bind(order.discount_amount.to_canonical_string())
        .bind(order.final_amount.to_canonical_string())
        .bind(encode_date(order.order_date))
        .bind(order.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition pending -> completed, stamping the completion time.
    pub async fn mark_completed(
        &self,
        id: OrderId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'completed', completed_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(encode_datetime(completed_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Explicit reopen: completed -> pending, clearing the completion time.
    pub async fn reopen_order(&self, id: OrderId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'pending', completed_at = NULL WHERE id = ? AND status = 'completed'",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an order; its deliveries and payments cascade. Customer
    /// balance is untouched by design (only deposit/balance_used mutations
    /// move it, through reconciliation).
    pub async fn delete_order(&self, id: OrderId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Maintenance: delete completed orders older than the cutoff date.
    pub async fn delete_completed_before(&self, cutoff: NaiveDate) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM orders WHERE status = 'completed' AND order_date < ?")
                .bind(encode_date(cutoff))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

pub(super) fn order_from_row(row: &SqliteRow) -> Order {
    let id: String = row.get("id");
    let customer_id: String = row.get("customer_id");
    let unit_price: String = row.get("unit_price");
    let discount_percent: String = row.get("discount_percent");
    let discount_cash: String = row.get("discount_cash");
    let shipping_fee: String = row.get("shipping_fee");
    let discount_amount: String = row.get("discount_amount");
    let final_amount: String = row.get("final_amount");
    let order_date: String = row.get("order_date");
    let status: String = row.get("status");
    let completed_at: Option<String> = row.get("completed_at");
    let created_at: String = row.get("created_at");

    Order {
        id: OrderId(decode_uuid(&id, "orders.id")),
        customer_id: CustomerId(decode_uuid(&customer_id, "orders.customer_id")),
        product: row.get("product"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        unit_price: decode_decimal(&unit_price, "orders.unit_price"),
        discount_percent: decode_decimal(&discount_percent, "orders.discount_percent"),
        discount_cash: decode_decimal(&discount_cash, "orders.discount_cash"),
        shipping_fee: decode_decimal(&shipping_fee, "orders.shipping_fee"),
        discount_amount: decode_decimal(&discount_amount, "orders.discount_amount"),
        final_amount: decode_decimal(&final_amount, "orders.final_amount"),
        order_date: decode_date(&order_date, "orders.order_date"),
        status: OrderStatus::from_db(&status),
        completed_at: completed_at.map(|s| decode_datetime(&s, "orders.completed_at")),
        created_at: decode_datetime(&created_at, "orders.created_at"),
    }
}
