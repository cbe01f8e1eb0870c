use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutriscan_core::domain::chat::errors::ChatError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PaymentRequired(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    InternalServerError(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApiErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::RateLimited(message) => ApiError::TooManyRequests(message),
            ChatError::QuotaExceeded(message) => ApiError::PaymentRequired(message),
            ChatError::Busy => ApiError::Conflict(error.to_string()),
            ChatError::InvalidMessage => ApiError::BadRequest(error.to_string()),
            ChatError::Upstream(_) | ChatError::Network(_) | ChatError::Config(_) => {
                ApiError::InternalServerError(error.to_string())
            }
        }
    }
}

/// `Json<T>` that also runs `validator` rules before the handler sees `T`.
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::BadRequest(errors.to_string()))?;

        Ok(ValidateJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_errors_map_to_statuses() {
        let cases = [
            (
                ChatError::RateLimited("slow down".to_string()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ChatError::QuotaExceeded("no credits".to_string()),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (ChatError::Busy, StatusCode::CONFLICT),
            (ChatError::InvalidMessage, StatusCode::BAD_REQUEST),
            (
                ChatError::Upstream("AI gateway error: 503".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ChatError::Network("reset".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ChatError::Config("missing key".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_relay_wording_is_kept() {
        let error = ApiError::from(ChatError::RateLimited(
            "Rate limit exceeded. Please try again later.".to_string(),
        ));

        assert_eq!(
            error.to_string(),
            "Rate limit exceeded. Please try again later."
        );
    }
}
