use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::domain::{Decimal, ProductId, ProductTemplate};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub default_quantity: i64,
    pub unit: Option<String>,
    pub default_unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub default_quantity: Option<i64>,
    pub unit: Option<String>,
    pub default_unit_price: Option<Decimal>,
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductTemplate>>, AppError> {
    Ok(Json(state.repo.list_active_products().await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductTemplate>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("name", "must not be empty"));
    }
    if req.default_quantity <= 0 {
        return Err(AppError::validation(
            "default_quantity",
            "must be greater than zero",
        ));
    }
    if req.default_unit_price.is_negative() {
        return Err(AppError::validation(
            "default_unit_price",
            "must be non-negative",
        ));
    }

    let product = ProductTemplate::new(
        req.name.trim().to_string(),
        req.default_quantity,
        req.unit.unwrap_or_else(|| "kg".to_string()),
        req.default_unit_price,
    );
    state.repo.insert_product(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    Path(id): Path<ProductId>,
    State(state): State<AppState>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductTemplate>, AppError> {
    let mut product = state
        .repo
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("name", "must not be empty"));
        }
        product.name = name.trim().to_string();
    }
    if let Some(default_quantity) = req.default_quantity {
        if default_quantity <= 0 {
            return Err(AppError::validation(
                "default_quantity",
                "must be greater than zero",
            ));
        }
        product.default_quantity = default_quantity;
    }
    if let Some(unit) = req.unit {
        product.unit = unit;
    }
    if let Some(default_unit_price) = req.default_unit_price {
        if default_unit_price.is_negative() {
            return Err(AppError::validation(
                "default_unit_price",
                "must be non-negative",
            ));
        }
        product.default_unit_price = default_unit_price;
    }

    state.repo.update_product(&product).await?;
    Ok(Json(product))
}

/// Soft delete; old orders keep the product name they copied at creation.
pub async fn delete_product(
    Path(id): Path<ProductId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if !state.repo.deactivate_product(id).await? {
        return Err(AppError::NotFound(format!("product {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
