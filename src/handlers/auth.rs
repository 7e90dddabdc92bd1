//! OAuth exchange-code endpoint
//!
//! The one flow that authenticates a user: validate, exchange the code,
//! resolve the profile, upsert the account, respond with the provider
//! tokens, a freshly signed session token and the account record. Any
//! failure short-circuits; no step retries and no compensating action is
//! taken for tokens obtained before a later step failed.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Exchange-code request body
#[derive(Debug, Deserialize)]
pub struct ExchangeCodeRequest {
    /// Authorization code from the provider redirect
    #[serde(default)]
    pub code: String,
    /// Opaque state value from the provider redirect
    #[serde(default)]
    pub state: String,
}

/// Exchange-code response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeCodeResponse {
    /// Provider access token
    pub access_token: String,
    /// Provider refresh token, when issued
    pub refresh_token: Option<String>,
    /// Provider ID token, when issued
    pub id_token: Option<String>,
    /// Session token for this service
    pub session_token: String,
    /// The local account
    pub user: User,
}

/// POST /api/auth/exchange-code
///
/// # Errors
///
/// 400 when `code` or `state` is missing (before any outbound call) or the
/// provider rejects the exchange; 500 when the provider is unreachable or
/// the profile fetch fails.
pub async fn exchange_code(
    State(state): State<AppState>,
    Json(request): Json<ExchangeCodeRequest>,
) -> Result<Json<ExchangeCodeResponse>, AppError> {
    if request.code.trim().is_empty() || request.state.trim().is_empty() {
        return Err(AppError::Validation(
            "Code and state are required".to_string(),
        ));
    }

    let token = state.oauth().exchange_code(&request.code).await?;
    let profile = state.oauth().fetch_profile(&token.access_token).await?;
    let user = User::find_or_create(state.pool(), &profile).await?;
    let session_token = state.session_tokens().issue(user.id)?;

    tracing::info!(
        user_id = user.id,
        provider_user_id = %user.provider_user_id,
        "exchange-code login completed"
    );

    Ok(Json(ExchangeCodeResponse {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        id_token: token.id_token,
        session_token,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn missing_state_is_rejected_before_any_outbound_call() {
        let server = test_server();

        let response = server
            .post("/api/auth/exchange-code")
            .json(&json!({ "code": "abc123" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Code and state are required" }));
    }

    #[tokio::test]
    async fn missing_code_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/auth/exchange-code")
            .json(&json!({ "state": "xyz" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Code and state are required" }));
    }

    #[tokio::test]
    async fn blank_values_count_as_missing() {
        let server = test_server();

        let response = server
            .post("/api/auth/exchange-code")
            .json(&json!({ "code": "  ", "state": "" }))
            .await;

        response.assert_status_bad_request();
    }
}
