//! Delivery and payment ledger operations, including the transactional
//! balance reconciliation that keeps `customers.balance` equal to the
//! full-recompute value after every balance-affecting mutation.

use crate::domain::{
    CustomerId, Decimal, Delivery, DeliveryId, EntryId, EntryKind, LedgerEntry, OrderId,
};
use crate::engine::balance::recompute_balance;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{
    decode_date, decode_datetime, decode_decimal, decode_uuid, encode_date, encode_datetime,
    Repository,
};

impl Repository {
    // =========================================================================
    // Deliveries
    // =========================================================================

    pub async fn insert_delivery(&self, delivery: &Delivery) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO deliveries (id, order_id, quantity, delivery_date) VALUES (?, ?, ?, ?)",
        )
        .bind(delivery.id.to_string())
        .bind(delivery.order_id.to_string())
        .bind(delivery.quantity)
        .bind(encode_date(delivery.delivery_date))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_deliveries_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Delivery>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT * FROM deliveries WHERE order_id = ? ORDER BY delivery_date ASC")
                .bind(order_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(delivery_from_row).collect())
    }

    pub async fn list_deliveries(&self) -> Result<Vec<Delivery>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM deliveries ORDER BY delivery_date ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(delivery_from_row).collect())
    }

    pub async fn delete_delivery(&self, id: DeliveryId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deliveries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Ledger entries
    // =========================================================================

    /// Insert an entry that does not move the prepaid balance (payments,
    /// refunds). Balance-affecting entries must go through
    /// [`Repository::insert_entry_reconciled`].
    pub async fn insert_entry(&self, entry: &LedgerEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, customer_id, order_id, amount, kind, payment_date, note, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.customer_id.to_string())
        .bind(entry.order_id.map(|o| o.to_string()))
        .bind(entry.amount.to_canonical_string())
        .bind(entry.kind.as_str())
        .bind(encode_date(entry.payment_date))
        .bind(entry.note.as_deref())
        .bind(encode_datetime(entry.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a deposit/balance_used entry and reconcile the customer's
    /// balance in the same transaction. Returns the recomputed balance.
    ///
    /// The write and the recompute commit or roll back together, so readers
    /// never observe a ledger/balance mismatch.
    pub async fn insert_entry_reconciled(
        &self,
        entry: &LedgerEntry,
    ) -> Result<Decimal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payments (id, customer_id, order_id, amount, kind, payment_date, note, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.customer_id.to_string())
        .bind(entry.order_id.map(|o| o.to_string()))
        .bind(entry.amount.to_canonical_string())
        .bind(entry.kind.as_str())
        .bind(encode_date(entry.payment_date))
        .bind(entry.note.as_deref())
        .bind(encode_datetime(entry.created_at))
        .execute(&mut *tx)
        .await?;

        let balance = reconcile_in_tx(&mut *tx, entry.customer_id).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Delete an entry and, when it was balance-affecting, reconcile the
    /// customer's balance in the same transaction. Returns the recomputed
    /// balance when reconciliation ran.
    pub async fn delete_entry_reconciled(
        &self,
        entry: &LedgerEntry,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(entry.id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let balance = if entry.kind.affects_balance() {
            Some(reconcile_in_tx(&mut *tx, entry.customer_id).await?)
        } else {
            None
        };
        tx.commit().await?;
        Ok(balance)
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM payments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| entry_from_row(&r)))
    }

    pub async fn list_entries_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE order_id = ? ORDER BY payment_date ASC, created_at ASC",
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }

    pub async fn list_entries_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE customer_id = ? ORDER BY payment_date ASC, created_at ASC",
        )
        .bind(customer_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }

    pub async fn list_entries(&self) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM payments ORDER BY payment_date ASC, created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }
}

/// Full balance recompute inside an open transaction: scan every entry for
/// the customer, apply the deposit-minus-balance_used formula, and persist
/// the result on the customer row.
async fn reconcile_in_tx(
    tx: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<Decimal, sqlx::Error> {
    let rows = sqlx::query("SELECT * FROM payments WHERE customer_id = ?")
        .bind(customer_id.to_string())
        .fetch_all(&mut *tx)
        .await?;
    let entries: Vec<LedgerEntry> = rows.iter().map(entry_from_row).collect();

    let balance = recompute_balance(&entries);

    sqlx::query("UPDATE customers SET balance = ? WHERE id = ?")
        .bind(balance.to_canonical_string())
        .bind(customer_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(balance)
}

pub(super) fn delivery_from_row(row: &SqliteRow) -> Delivery {
    let id: String = row.get("id");
    let order_id: String = row.get("order_id");
    let delivery_date: String = row.get("delivery_date");

    Delivery {
        id: DeliveryId(decode_uuid(&id, "deliveries.id")),
        order_id: OrderId(decode_uuid(&order_id, "deliveries.order_id")),
        quantity: row.get("quantity"),
        delivery_date: decode_date(&delivery_date, "deliveries.delivery_date"),
    }
}

pub(super) fn entry_from_row(row: &SqliteRow) -> LedgerEntry {
    let id: String = row.get("id");
    let customer_id: String = row.get("customer_id");
    let order_id: Option<String> = row.get("order_id");
    let amount: String = row.get("amount");
    let kind: Option<String> = row.get("kind");
    let payment_date: String = row.get("payment_date");
    let created_at: String = row.get("created_at");

    LedgerEntry {
        id: EntryId(decode_uuid(&id, "payments.id")),
        customer_id: CustomerId(decode_uuid(&customer_id, "payments.customer_id")),
        order_id: order_id.map(|o| OrderId(decode_uuid(&o, "payments.order_id"))),
        amount: decode_decimal(&amount, "payments.amount"),
        kind: EntryKind::from_db(kind.as_deref()),
        payment_date: decode_date(&payment_date, "payments.payment_date"),
        note: row.get("note"),
        created_at: decode_datetime(&created_at, "payments.created_at"),
    }
}
