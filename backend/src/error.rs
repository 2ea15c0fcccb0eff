//! Application error handling
//!
//! Converts service errors into HTTP responses. Storage and signing
//! failures are logged and replaced with a generic message so that no
//! backend detail reaches the client.

use crate::auth::TokenError;
use crate::repositories::StoreError;
use accounts_shared::{FieldErrors, MessageResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Body returned for any failed login
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level validation failures, all reported together
    #[error("Validation error")]
    Validation(FieldErrors),

    /// Unknown email or wrong password; the two are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Account store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn error_body(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.into(),
        },
    });
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(MessageResponse::new(INVALID_CREDENTIALS)),
            )
                .into_response(),
            ApiError::Token(TokenError::Encoding(msg)) => {
                error!("Token signing failed: {}", msg);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred",
                )
            }
            ApiError::Token(err) => {
                debug!("Rejected token: {}", err);
                error_body(
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_NOT_VALID",
                    "Token is invalid or expired",
                )
            }
            ApiError::Unauthorized(msg) => error_body(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Store(StoreError::Duplicate(field)) => {
                let mut errors = FieldErrors::new();
                errors.add(field.field_name(), field.duplicate_message());
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::Store(err) => {
                error!("Account store error: {:?}", err);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred",
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred",
                )
            }
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::UniqueField;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_bare_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("password", "This password is too common.");
        let response = ApiError::Validation(errors).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "password": ["This password is too common."] })
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_body() {
        let response = ApiError::InvalidCredentials.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Invalid credentials" })
        );
    }

    #[tokio::test]
    async fn test_token_errors_share_one_response() {
        let expired = body_json(ApiError::Token(TokenError::Expired).into_response()).await;
        let forged = body_json(ApiError::Token(TokenError::InvalidSignature).into_response()).await;

        assert_eq!(expired, forged);
        assert_eq!(expired["error"]["code"], "TOKEN_NOT_VALID");
    }

    #[test]
    fn test_token_error_status() {
        let response = ApiError::Token(TokenError::Malformed).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_store_error_becomes_validation() {
        let response = ApiError::Store(StoreError::Duplicate(UniqueField::Email)).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "email": ["A user with this email already exists."] })
        );
    }

    #[tokio::test]
    async fn test_backend_store_error_is_not_leaked() {
        let response =
            ApiError::Store(StoreError::Backend("duplicate key value violates".to_string()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await.to_string();
        assert!(!body.contains("duplicate key"));
    }

    #[test]
    fn test_not_found_error_status() {
        let response = ApiError::NotFound("Account not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
