//! Admin user management

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AdminOnly;
use crate::error::AppError;
use crate::models::{User, UserRole};
use crate::state::AppState;

/// Admin user-update request body
///
/// `profileCompleted` is applied verbatim when present: an explicit
/// override, independent of whether name/address/phone are populated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New role
    pub role: Option<UserRole>,
    /// Profile-completed override
    pub profile_completed: Option<bool>,
}

/// PUT /api/admin/users/{id}
///
/// # Errors
///
/// 401/403 on auth failure, 404 for an unknown user, 500 on database
/// failure.
pub async fn update_user(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = User::admin_update(state.pool(), id, request.role, request.profile_completed)
        .await
        .map_err(|e| super::not_found_as(e, "User not found"))?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        role = user.role.as_str(),
        profile_completed = user.profile_completed,
        "user updated by admin"
    );

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn admin_update_requires_authentication() {
        let server = test_server();

        let response = server
            .put("/api/admin/users/1")
            .json(&json!({ "profileCompleted": true }))
            .await;

        response.assert_status_unauthorized();
    }
}
