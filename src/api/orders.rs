use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{CustomerId, Decimal, Delivery, LedgerEntry, Order, OrderId};
use crate::engine::{totals, OrderRecords};
use crate::error::AppError;
use crate::orchestration::{NewOrder, OrderUpdate};

/// An order plus its child records and derived totals; the shape every
/// order-returning endpoint responds with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub total_delivered: i64,
    pub remaining_delivery: i64,
    pub total_paid: Decimal,
    pub remaining_payment: Decimal,
    pub deliveries: Vec<Delivery>,
    pub payments: Vec<LedgerEntry>,
}

impl OrderDetail {
    pub fn from_records(records: OrderRecords) -> Self {
        let OrderRecords {
            order,
            deliveries,
            payments,
        } = records;
        OrderDetail {
            total_delivered: totals::total_delivered(&deliveries),
            remaining_delivery: totals::remaining_delivery(&order, &deliveries),
            total_paid: totals::total_paid(&payments),
            remaining_payment: totals::remaining_payment(&order, &payments),
            order,
            deliveries,
            payments,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub unit_price: Decimal,
    pub discount_percent: Option<Decimal>,
    pub discount_cash: Option<Decimal>,
    pub shipping_fee: Option<Decimal>,
}

/// One request creates one or more orders for a single customer; the
/// multi-item form backs the multi-product checkout flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrdersRequest {
    pub customer_id: CustomerId,
    pub order_date: Option<NaiveDate>,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub discount_cash: Option<Decimal>,
    pub shipping_fee: Option<Decimal>,
    pub order_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub customer_id: Option<CustomerId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub days_old: i64,
}

pub async fn list_orders(
    Query(params): Query<ListOrdersQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    let snapshot = state.repo.load_snapshot().await?;
    let details = snapshot
        .orders
        .into_iter()
        .filter(|rec| match params.customer_id {
            Some(id) => rec.order.customer_id == id,
            None => true,
        })
        .map(OrderDetail::from_records)
        .collect();
    Ok(Json(details))
}

pub async fn create_orders(
    State(state): State<AppState>,
    Json(req): Json<CreateOrdersRequest>,
) -> Result<(StatusCode, Json<Vec<Order>>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::validation("items", "at least one item required"));
    }
    let order_date = req.order_date.unwrap_or_else(|| Utc::now().date_naive());

    let cmds: Vec<NewOrder> = req
        .items
        .into_iter()
        .map(|item| NewOrder {
            customer_id: req.customer_id,
            product: item.product,
            quantity: item.quantity,
            unit: item.unit.unwrap_or_else(|| "kg".to_string()),
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            discount_cash: item.discount_cash.unwrap_or_else(Decimal::zero),
            shipping_fee: item.shipping_fee.unwrap_or_else(Decimal::zero),
            order_date,
        })
        .collect();

    let orders = state.service.create_orders(cmds).await?;
    Ok((StatusCode::CREATED, Json(orders)))
}

pub async fn get_order(
    Path(id): Path<OrderId>,
    State(state): State<AppState>,
) -> Result<Json<OrderDetail>, AppError> {
    let records = state
        .repo
        .load_order_records(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", id)))?;
    Ok(Json(OrderDetail::from_records(records)))
}

pub async fn update_order(
    Path(id): Path<OrderId>,
    State(state): State<AppState>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let update = OrderUpdate {
        product: req.product,
        quantity: req.quantity,
        unit: req.unit,
        unit_price: req.unit_price,
        discount_percent: req.discount_percent,
        discount_cash: req.discount_cash,
        shipping_fee: req.shipping_fee,
        order_date: req.order_date,
    };
    let order = state.service.update_order(id, update).await?;
    Ok(Json(order))
}

pub async fn delete_order(
    Path(id): Path<OrderId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reopen_order(
    Path(id): Path<OrderId>,
    State(state): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let order = state.service.reopen_order(id).await?;
    Ok(Json(order))
}

pub async fn cleanup_orders(
    State(state): State<AppState>,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.service.cleanup_old_orders(req.days_old).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
