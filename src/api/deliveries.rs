use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Delivery, DeliveryId, Order, OrderId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDeliveryRequest {
    pub quantity: i64,
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub delivery: Delivery,
    /// The order after the completion check, in case the delivery tipped it.
    pub order: Order,
}

pub async fn add_delivery(
    Path(order_id): Path<OrderId>,
    State(state): State<AppState>,
    Json(req): Json<AddDeliveryRequest>,
) -> Result<(StatusCode, Json<DeliveryResponse>), AppError> {
    let delivery_date = req.delivery_date.unwrap_or_else(|| Utc::now().date_naive());
    let (delivery, order) = state
        .service
        .add_delivery(order_id, req.quantity, delivery_date)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DeliveryResponse { delivery, order }),
    ))
}

pub async fn delete_delivery(
    Path(id): Path<DeliveryId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.service.delete_delivery(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
