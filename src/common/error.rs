use crate::services::CheckoutError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    /// A required body field is missing or blank, carries the client message.
    BodyFieldMissing(&'static str),
    DuplicateDevice,
    ResourceNotFound,
    AlreadyTaken,
    Internal(anyhow::Error),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BodyFieldMissing(message) => f.write_str(message),
            ApiError::DuplicateDevice => f.write_str("Device already exists"),
            ApiError::ResourceNotFound => f.write_str("Device not found"),
            ApiError::AlreadyTaken => f.write_str("Device is already taken"),
            ApiError::Internal(_) => f.write_str("Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = match &self {
            ApiError::BodyFieldMissing(_) | ApiError::DuplicateDevice | ApiError::AlreadyTaken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(err) => {
                tracing::error!("{}", err);
                err.chain()
                    .skip(1)
                    .for_each(|cause| tracing::error!("Because: {}", cause));
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), "{}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(value: CheckoutError) -> Self {
        match value {
            CheckoutError::Validation(message) => ApiError::BodyFieldMissing(message),
            CheckoutError::Conflict => ApiError::DuplicateDevice,
            CheckoutError::NotFound => ApiError::ResourceNotFound,
            CheckoutError::AlreadyTaken => ApiError::AlreadyTaken,
            err @ CheckoutError::Storage(_) => ApiError::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_domain_errors_map_to_status() {
        let (status, body) = render(CheckoutError::AlreadyTaken.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Device is already taken" }));

        let (status, body) = render(CheckoutError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Device not found" }));

        let (status, body) = render(CheckoutError::Conflict.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Device already exists" }));

        let (status, body) =
            render(CheckoutError::Validation("Serial number is required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Serial number is required" }));
    }

    #[tokio::test]
    async fn test_storage_error_hides_detail() {
        let err = CheckoutError::Storage(sqlx::Error::PoolTimedOut);
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}
