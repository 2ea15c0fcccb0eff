//! JSON request bodies
//!
//! [`JsonBody`] replaces axum's `Json` on the account routes. A body that
//! is not JSON, or does not have the expected shape, is turned into the
//! route's own error instead of axum's plain-text 4xx rejection.

use crate::auth::TokenError;
use crate::error::ApiError;
use crate::services::RegistrationForm;
use accounts_shared::validation::NON_FIELD_ERRORS;
use accounts_shared::{FieldErrors, LoginRequest, RefreshRequest, RegisterRequest};
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::Value;
use tracing::debug;

/// A request type that can be built from a parsed JSON document
pub trait FromJsonBody: Sized {
    fn from_json(body: Value) -> Result<Self, ApiError>;

    /// Error for a body that could not be parsed as JSON at all
    fn unreadable() -> ApiError;
}

/// JSON request body extractor
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: FromJsonBody + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("Unreadable request body: {}", rejection);
                T::unreadable()
            })?;

        T::from_json(body).map(JsonBody)
    }
}

impl FromJsonBody for RegistrationForm {
    fn from_json(body: Value) -> Result<Self, ApiError> {
        RegisterRequest::from_json(&body)
            .map(|(request, errors)| RegistrationForm { request, errors })
            .map_err(ApiError::Validation)
    }

    fn unreadable() -> ApiError {
        let mut errors = FieldErrors::new();
        errors.add(NON_FIELD_ERRORS, "Request body must be a valid JSON object.");
        ApiError::Validation(errors)
    }
}

// Any shape problem on login is just another failed login
impl FromJsonBody for LoginRequest {
    fn from_json(body: Value) -> Result<Self, ApiError> {
        serde_json::from_value(body).map_err(|_| ApiError::InvalidCredentials)
    }

    fn unreadable() -> ApiError {
        ApiError::InvalidCredentials
    }
}

impl FromJsonBody for RefreshRequest {
    fn from_json(body: Value) -> Result<Self, ApiError> {
        serde_json::from_value(body).map_err(|_| ApiError::Token(TokenError::Malformed))
    }

    fn unreadable() -> ApiError {
        ApiError::Token(TokenError::Malformed)
    }
}
