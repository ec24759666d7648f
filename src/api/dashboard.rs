use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::engine::{self, Aggregates};
use crate::error::AppError;

/// Global debt/backlog aggregates for the dashboard header.
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Aggregates>, AppError> {
    let snapshot = state.repo.load_snapshot().await?;
    Ok(Json(engine::compute_aggregates(&snapshot)))
}
