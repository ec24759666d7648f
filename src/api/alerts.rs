use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::AppState;
use crate::config::AlertThresholds;
use crate::engine::{self, Alert};
use crate::error::AppError;

/// Optional per-request threshold overrides; anything omitted falls back
/// to the configured defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    pub delivery_days: Option<i64>,
    pub payment_days: Option<i64>,
    pub birthday_days: Option<i64>,
}

pub async fn get_alerts(
    Query(params): Query<AlertsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let defaults = state.config.alert_thresholds;
    let thresholds = AlertThresholds {
        delivery_alert_days: params.delivery_days.unwrap_or(defaults.delivery_alert_days),
        payment_alert_days: params.payment_days.unwrap_or(defaults.payment_alert_days),
        birthday_alert_days: params.birthday_days.unwrap_or(defaults.birthday_alert_days),
    };
    for (field, value) in [
        ("deliveryDays", thresholds.delivery_alert_days),
        ("paymentDays", thresholds.payment_alert_days),
        ("birthdayDays", thresholds.birthday_alert_days),
    ] {
        if value < 0 {
            return Err(AppError::validation(field, "must be non-negative"));
        }
    }

    let snapshot = state.repo.load_snapshot().await?;
    let today = Utc::now().date_naive();
    Ok(Json(engine::compute_alerts(&snapshot, &thresholds, today)))
}
