//! Error types and error handling
//!
//! One application-wide [`AppError`] covers every failure a handler can
//! produce. Implementing [`IntoResponse`] lets handlers return
//! `Result<_, AppError>` directly; nothing propagates past the handler
//! boundary. Error bodies are `{"error": "<message>"}` and the underlying
//! message is echoed to the caller, including on 500s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::token::TokenError;
use crate::email::EmailError;
use crate::images::ImageHostError;
use crate::oauth::OAuthError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// Structured validation failure from `validator` derive (400)
    #[error("Validation failed")]
    Invalid(#[from] validator::ValidationErrors),

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// OAuth provider failure (400 for token exchange, 500 for profile fetch)
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// Session token failure (401)
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Image host failure (500)
    #[error(transparent)]
    ImageHost(#[from] ImageHostError),

    /// Email provider failure (500)
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Database failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else (500)
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::OAuth(err) => match err {
                // Bad or expired codes are the caller's fault.
                OAuthError::TokenExchange(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ImageHost(_) | Self::Email(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Invalid(errors) => format!("Validation failed: {errors}"),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let response = AppError::Validation("Code and state are required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn token_exchange_maps_to_400_profile_fetch_to_500() {
        let exchange = AppError::OAuth(OAuthError::TokenExchange("invalid_grant".into()));
        assert_eq!(exchange.status(), StatusCode::BAD_REQUEST);

        let profile = AppError::OAuth(OAuthError::ProfileFetch("HTTP 401".into()));
        assert_eq!(profile.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            AppError::Unauthorized("Missing token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("Admin role required".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn body_carries_error_key() {
        let response = AppError::NotFound("Product not found".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Product not found");
    }
}
