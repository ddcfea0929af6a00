//! `AppError` and the JSON error body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned to the client as `{code, message, details}`
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Field names, ids and other context for the client
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// `ValidationFailed` with a custom message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `RequiredField` naming the missing field
    pub fn required(field: &'static str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }
}

/// Error body sent with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ApiResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        let body = ApiResponse::from(&self);
        (self.http_status(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn default_message_comes_from_the_code() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn details_accumulate() {
        let err = AppError::validation("Quantity must be at least 1")
            .with_detail("menuItemId", 10)
            .with_detail("index", 0);

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["menuItemId"], 10);
        assert_eq!(details["index"], 0);
    }

    #[test]
    fn required_names_the_field() {
        let err = AppError::required("paymentMode");
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "paymentMode is required");
        assert_eq!(err.details.unwrap()["field"], "paymentMode");
        assert_eq!(
            AppError::required("paymentMode").http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn error_body_shape() {
        let err = AppError::new(ErrorCode::TableOccupied).with_detail("tableNumber", "5");
        let body = serde_json::to_value(ApiResponse::from(&err)).unwrap();
        assert_eq!(body["code"], 7002);
        assert_eq!(body["message"], "Table has an unpaid order");
        assert_eq!(body["details"]["tableNumber"], "5");

        let bare = serde_json::to_value(ApiResponse::from(&AppError::new(ErrorCode::NotFound))).unwrap();
        assert!(bare.get("details").is_none());
    }

    #[test]
    fn response_uses_the_code_status() {
        let response = AppError::new(ErrorCode::OrderAlreadyPaid).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
