use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{CustomerId, Decimal, EntryId, EntryKind, LedgerEntry, Order, OrderId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub customer_id: Option<CustomerId>,
    pub order_id: Option<OrderId>,
    pub amount: Decimal,
    /// `payment`, `balance_used`, or `refund`. Deposits go through
    /// `/v1/customers/:id/deposits`.
    pub kind: String,
    pub payment_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub entry: LedgerEntry,
    /// Present when the payment targeted an order; carries the possibly
    /// auto-completed status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// Present for balance-funded payments: the reconciled balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let payment_date = req.payment_date.unwrap_or_else(|| Utc::now().date_naive());

    let response = match req.kind.as_str() {
        "payment" | "refund" => {
            let kind = if req.kind == "payment" {
                EntryKind::Payment
            } else {
                EntryKind::Refund
            };
            let order_id = req
                .order_id
                .ok_or_else(|| AppError::validation("order_id", "required for this kind"))?;
            let (entry, order) = state
                .service
                .record_payment(
                    req.customer_id,
                    order_id,
                    req.amount,
                    kind,
                    payment_date,
                    req.note,
                )
                .await?;
            PaymentResponse {
                entry,
                order: Some(order),
                balance: None,
            }
        }
        "balance_used" => {
            let (entry, balance, order) = state
                .service
                .pay_from_balance(
                    req.customer_id,
                    req.order_id,
                    req.amount,
                    payment_date,
                    req.note,
                )
                .await?;
            PaymentResponse {
                entry,
                order,
                balance: Some(balance),
            }
        }
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown payment kind '{}'",
                other
            )))
        }
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Deleting a payment never auto-reverts a completed order; balance
/// reconciliation runs only for balance-affecting entries.
pub async fn delete_payment(
    Path(id): Path<EntryId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.service.delete_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
