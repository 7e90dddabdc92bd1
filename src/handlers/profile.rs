//! Profile save and completion check

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Save-profile request body
///
/// Name, address and phone are all required; supplying them is what flips
/// the profile-completed flag.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    /// External provider identifier of the account
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Full name
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Postal address
    #[serde(default)]
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    /// Phone number
    #[serde(default)]
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    /// Email, optional; an existing email is kept when omitted
    pub email: Option<String>,
}

/// Save-profile response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileResponse {
    /// Always true after a successful save
    pub profile_completed: bool,
    /// The saved account
    pub user: User,
}

/// POST /api/save-profile
///
/// Creates the account if it does not exist yet; idempotent for identical
/// input.
///
/// # Errors
///
/// 400 on missing fields, 500 on database failure.
pub async fn save_profile(
    State(state): State<AppState>,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<SaveProfileResponse>, AppError> {
    request.validate()?;

    let user = User::save_profile(
        state.pool(),
        &request.user_id,
        &request.name,
        &request.address,
        &request.phone,
        request.email.as_deref(),
    )
    .await?;

    tracing::info!(user_id = user.id, "profile saved");

    Ok(Json(SaveProfileResponse {
        profile_completed: user.profile_completed,
        user,
    }))
}

/// Check-profile request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckProfileRequest {
    /// External provider identifier
    pub user_id: Option<String>,
    /// Email to fall back to
    pub email: Option<String>,
}

/// Check-profile response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckProfileResponse {
    /// The account's completion flag
    pub profile_completed: bool,
}

/// POST /api/check-profile
///
/// # Errors
///
/// 400 when neither `userId` nor `email` is given, 404 when no account
/// matches.
pub async fn check_profile(
    State(state): State<AppState>,
    Json(request): Json<CheckProfileRequest>,
) -> Result<Json<CheckProfileResponse>, AppError> {
    let user = match (
        request.user_id.as_deref().filter(|v| !v.is_empty()),
        request.email.as_deref().filter(|v| !v.is_empty()),
    ) {
        (Some(user_id), _) => User::find_by_provider_id(state.pool(), user_id).await?,
        (None, Some(email)) => User::find_by_email(state.pool(), email).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "userId or email is required".to_string(),
            ))
        }
    };

    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(CheckProfileResponse {
        profile_completed: user.profile_completed,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn save_profile_requires_name_address_phone() {
        let server = test_server();

        let response = server
            .post("/api/save-profile")
            .json(&json!({ "userId": "U1", "name": "Ada" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("address"));
        assert!(message.contains("phone"));
    }

    #[tokio::test]
    async fn check_profile_requires_user_id_or_email() {
        let server = test_server();

        let response = server.post("/api/check-profile").json(&json!({})).await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "userId or email is required" }));
    }

    #[tokio::test]
    async fn check_profile_treats_empty_strings_as_missing() {
        let server = test_server();

        let response = server
            .post("/api/check-profile")
            .json(&json!({ "userId": "", "email": "" }))
            .await;

        response.assert_status_bad_request();
    }
}
