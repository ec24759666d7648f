use crate::domain::Decimal;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Engine error taxonomy.
///
/// All variants surface to the caller unmodified; the engine performs no
/// silent recovery. A failed mutation leaves ledger and balance state
/// unchanged.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input, rejected before any write.
    #[error("Validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },
    /// Balance-funded payment exceeds the current prepaid balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    /// Defensive check failure; indicates a bug if it ever fires.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation failure naming the offending field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InconsistentState(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
