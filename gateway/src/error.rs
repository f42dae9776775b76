//! Gateway error types.
//!
//! [`GatewayError`] covers startup and configuration failures;
//! [`ApiError`] is the structured JSON body every failed request gets.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quickbite_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// Startup/lifecycle error type for the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or bootstrap error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error code (e.g., "INVALID_TABLE", "NOT_FOUND", "INTERNAL_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional details for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self {
            code: "INVALID_INPUT".to_string(),
            message: msg.into(),
            details: None,
        }
    }

    pub fn invalid_table(table: impl Into<String>) -> Self {
        Self {
            code: "INVALID_TABLE".to_string(),
            message: "Invalid table name".to_string(),
            details: Some(serde_json::Value::String(table.into())),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found", resource.into()),
            details: None,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: msg.into(),
            details: None,
        }
    }

    pub fn no_searchable_columns() -> Self {
        Self {
            code: "NO_SEARCHABLE_COLUMNS".to_string(),
            message: "No searchable columns found".to_string(),
            details: None,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: msg.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_INPUT" | "INVALID_TABLE" | "NO_SEARCHABLE_COLUMNS" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

/// Map a core error to the wire taxonomy. Store detail strings are only
/// attached when `expose` is set (non-production mode).
pub fn from_core(err: CoreError, expose: bool) -> ApiError {
    match err {
        CoreError::UnknownTable(table) => ApiError::invalid_table(table),
        CoreError::NotFound => ApiError::not_found("Record"),
        CoreError::InvalidInput(msg) => ApiError::invalid_input(msg),
        CoreError::NoSearchableColumns => ApiError::no_searchable_columns(),
        CoreError::Store(e) => {
            tracing::error!("store error: {e}");
            let base = ApiError::internal("An internal error occurred");
            if expose {
                base.with_details(e.to_string())
            } else {
                base
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(
            from_core(CoreError::UnknownTable("x".into()), false).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            from_core(CoreError::NotFound, false).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            from_core(CoreError::InvalidInput("missing".into()), false).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            from_core(CoreError::NoSearchableColumns, false).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("nope").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_details_are_gated_by_expose() {
        let err = from_core(CoreError::Store(sqlx::Error::PoolClosed), false);
        assert!(err.details.is_none());

        let err = from_core(CoreError::Store(sqlx::Error::PoolClosed), true);
        assert!(err.details.is_some());
    }
}
