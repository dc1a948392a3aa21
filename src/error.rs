use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::cache::RateLimitDecision;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Too many requests, please try again later")]
    RateLimited(RateLimitDecision),
    #[error("Search limit reached ({used}/{limit}), please upgrade your plan")]
    QuotaExceeded { limit: i32, used: i32 },
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, error_codes::RATE_LIMIT),
            AppError::QuotaExceeded { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, error_codes::QUOTA_EXCEEDED)
            }
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(format!("Database error: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = error_to_api_response::<()>(code, self.to_string());
        let mut response = (status, body).into_response();

        if let AppError::RateLimited(decision) = &self {
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
            headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_at_secs()));
        }

        response
    }
}
