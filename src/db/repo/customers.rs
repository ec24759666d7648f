//! Customer operations for the repository.

use crate::domain::{Customer, CustomerId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_date, decode_datetime, decode_decimal, decode_uuid, encode_date, encode_datetime, Repository};

impl Repository {
    /// Insert a new customer. Balance is persisted as written (zero for new
    /// customers; the reconciler owns it afterwards).
    pub async fn insert_customer(&self, customer: &Customer) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, balance, discount_percent, birthday, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer.id.to_string())
        .bind(&customer.name)
        .bind(customer.phone.as_deref())
        .bind(customer.balance.to_canonical_string())
        .bind(customer.discount_percent.to_canonical_string())
        .bind(customer.birthday.map(encode_date))
        .bind(encode_datetime(customer.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| customer_from_row(&r)))
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM customers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(customer_from_row).collect())
    }

    /// Update profile fields. Deliberately excludes `balance`: no code path
    /// outside reconciliation may write it.
    pub async fn update_customer_profile(&self, customer: &Customer) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, phone = ?, discount_percent = ?, birthday = ?
            WHERE id = ?
            "#,
        )
        .bind(&customer.name)
        .bind(customer.phone.as_deref())
        .bind(customer.discount_percent.to_canonical_string())
        .bind(customer.birthday.map(encode_date))
        .bind(customer.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a customer. Orders, deliveries, and payments cascade via
    /// foreign keys.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(super) fn customer_from_row(row: &SqliteRow) -> Customer {
    let id: String = row.get("id");
    let balance: String = row.get("balance");
    let discount_percent: String = row.get("discount_percent");
    let birthday: Option<String> = row.get("birthday");
    let created_at: String = row.get("created_at");

    Customer {
        id: CustomerId(decode_uuid(&id, "customers.id")),
        name: row.get("name"),
        phone: row.get("phone"),
        balance: decode_decimal(&balance, "customers.balance"),
        discount_percent: decode_decimal(&discount_percent, "customers.discount_percent"),
        birthday: birthday.map(|b| decode_date(&b, "customers.birthday")),
        created_at: decode_datetime(&created_at, "customers.created_at"),
    }
}
