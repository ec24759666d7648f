use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::orders::OrderDetail;
use crate::api::AppState;
use crate::domain::{Customer, CustomerId, Decimal, LedgerEntry};
use crate::engine::{self, totals, CustomerStats};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub birthday: Option<NaiveDate>,
}

/// Nullable fields distinguish "omitted" (keep the stored value) from an
/// explicit `null` (clear it).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub discount_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthday: Option<Option<NaiveDate>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    pub entry: LedgerEntry,
    pub balance: Decimal,
}

/// Full per-customer view: profile, outstanding debt, every order with its
/// deliveries and payments, and the full ledger history (deposits included).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    #[serde(flatten)]
    pub customer: Customer,
    pub total_debt: Decimal,
    pub orders: Vec<OrderDetail>,
    pub transactions: Vec<LedgerEntry>,
}

/// Customer list with per-customer debt rollups.
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerStats>>, AppError> {
    let snapshot = state.repo.load_snapshot().await?;
    Ok(Json(engine::compute_customer_stats(&snapshot)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("name", "must not be empty"));
    }
    let discount_percent = req.discount_percent.unwrap_or_else(Decimal::zero);
    validate_discount(discount_percent)?;

    let customer = Customer::new(
        req.name.trim().to_string(),
        req.phone,
        discount_percent,
        req.birthday,
    );
    state.repo.insert_customer(&customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    Path(id): Path<CustomerId>,
    State(state): State<AppState>,
) -> Result<Json<CustomerReport>, AppError> {
    let snapshot = state.repo.load_snapshot().await?;
    let customer = snapshot
        .customers
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))?;

    let mut total_debt = Decimal::zero();
    let mut orders = Vec::new();
    for rec in snapshot.orders {
        if rec.order.customer_id != id {
            continue;
        }
        if !rec.order.is_completed() {
            total_debt = total_debt + totals::order_debt(&rec.order, &rec.payments);
        }
        orders.push(OrderDetail::from_records(rec));
    }
    let transactions = snapshot
        .entries
        .into_iter()
        .filter(|e| e.customer_id == id)
        .collect();

    Ok(Json(CustomerReport {
        customer,
        total_debt,
        orders,
        transactions,
    }))
}

/// Profile update only; `balance` is reconciler-owned and not editable here.
pub async fn update_customer(
    Path(id): Path<CustomerId>,
    State(state): State<AppState>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let mut customer = state
        .repo
        .get_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("name", "must not be empty"));
        }
        customer.name = name.trim().to_string();
    }
    if let Some(phone) = req.phone {
        customer.phone = phone;
    }
    if let Some(discount_percent) = req.discount_percent {
        validate_discount(discount_percent)?;
        customer.discount_percent = discount_percent;
    }
    if let Some(birthday) = req.birthday {
        customer.birthday = birthday;
    }

    state.repo.update_customer_profile(&customer).await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    Path(id): Path<CustomerId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if !state.repo.delete_customer(id).await? {
        return Err(AppError::NotFound(format!("customer {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deposit(
    Path(id): Path<CustomerId>,
    State(state): State<AppState>,
    Json(req): Json<DepositRequest>,
) -> Result<(StatusCode, Json<DepositResponse>), AppError> {
    let payment_date = req.payment_date.unwrap_or_else(|| Utc::now().date_naive());
    let (entry, balance) = state
        .service
        .record_deposit(id, req.amount, payment_date, req.note)
        .await?;
    Ok((StatusCode::CREATED, Json(DepositResponse { entry, balance })))
}

fn validate_discount(discount: Decimal) -> Result<(), AppError> {
    if discount.is_negative() || discount > Decimal::hundred() {
        return Err(AppError::validation(
            "discount_percent",
            "must be between 0 and 100",
        ));
    }
    Ok(())
}
