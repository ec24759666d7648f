//! Product template operations for the repository.

use crate::domain::{ProductId, ProductTemplate};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_decimal, decode_uuid, Repository};

impl Repository {
    pub async fn insert_product(&self, product: &ProductTemplate) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, default_quantity, unit, default_unit_price, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(product.default_quantity)
        .bind(&product.unit)
        .bind(product.default_unit_price.to_canonical_string())
        .bind(product.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<ProductTemplate>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| product_from_row(&r)))
    }

    /// Active templates only; deactivated ones stay in the table so old
    /// orders keep a name to point at.
    pub async fn list_active_products(&self) -> Result<Vec<ProductTemplate>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM products WHERE is_active = 1 ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    pub async fn update_product(&self, product: &ProductTemplate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, default_quantity = ?, unit = ?, default_unit_price = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.default_quantity)
        .bind(&product.unit)
        .bind(product.default_unit_price.to_canonical_string())
        .bind(product.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft delete: flip `is_active` off.
    pub async fn deactivate_product(&self, id: ProductId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(super) fn product_from_row(row: &SqliteRow) -> ProductTemplate {
    let id: String = row.get("id");
    let default_unit_price: String = row.get("default_unit_price");

    ProductTemplate {
        id: ProductId(decode_uuid(&id, "products.id")),
        name: row.get("name"),
        default_quantity: row.get("default_quantity"),
        unit: row.get("unit"),
        default_unit_price: decode_decimal(&default_unit_price, "products.default_unit_price"),
        is_active: row.get("is_active"),
    }
}
