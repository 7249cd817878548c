//! Error types for budgetview-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use budgetview_core::error::ErrorCode;
use budgetview_core::CoreError;
use budgetview_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Core(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let ApiError::Core(err) = self;
        match err.code() {
            ErrorCode::EnvelopeNotFound | ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,
            ErrorCode::RuntimeStopped => StatusCode::SERVICE_UNAVAILABLE,
            _ if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let ApiError::Core(err) = &self;
        let body = serde_json::to_value(err.to_details())
            .unwrap_or_else(|_| serde_json::json!({ "message": err.to_string() }));
        if status.is_server_error() {
            log::error!(target: "budgetview::api", "{}", self);
        }
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err: ApiError = StoreError::TransactionNotFound { id: "t1".to_string() }.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::Core(CoreError::UnknownColumn { name: "payee".to_string() });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::Core(CoreError::RuntimeStopped);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
