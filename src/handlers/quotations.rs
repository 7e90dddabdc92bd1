//! Quotation submission and admin listing

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use crate::auth::AdminOnly;
use crate::email::{self, Email};
use crate::error::AppError;
use crate::models::Quotation;
use crate::state::AppState;

/// Quotation request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    /// Requester name
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Requester email
    #[serde(default)]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    /// Requester phone
    #[serde(default)]
    pub phone: String,
    /// Free-form message
    #[serde(default)]
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    /// Service the request is about
    pub service_id: Option<i64>,
}

/// POST /api/quotations
///
/// Stores the request and notifies the configured recipient; the email is
/// retried once and failures are logged, never surfaced; the stored
/// quotation is what matters.
///
/// # Errors
///
/// 400 on invalid input, 500 on database failure.
pub async fn create_quotation(
    State(state): State<AppState>,
    Json(request): Json<QuotationRequest>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    request.validate()?;

    let quotation = Quotation::create(
        state.pool(),
        &request.name,
        &request.email,
        &request.phone,
        &request.message,
        request.service_id,
    )
    .await?;

    tracing::info!(quotation_id = quotation.id, "quotation submitted");

    let notification = Email::new()
        .to(&state.settings().email.notify)
        .subject(format!("New quotation request from {}", quotation.name))
        .text(format!(
            "{} <{}> ({})\n\n{}\n",
            quotation.name, quotation.email, quotation.phone, quotation.message
        ));

    if let Err(e) = email::send_with_retry(state.email(), notification).await {
        tracing::warn!(quotation_id = quotation.id, error = %e, "quotation notification failed");
    }

    Ok((StatusCode::CREATED, Json(quotation)))
}

/// GET /api/quotations (admin)
///
/// # Errors
///
/// 401/403 on auth failure, 500 on database failure.
pub async fn list_quotations(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Result<Json<Vec<Quotation>>, AppError> {
    Ok(Json(Quotation::list(state.pool()).await?))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn quotation_requires_valid_email() {
        let server = test_server();

        let response = server
            .post("/api/quotations")
            .json(&json!({ "name": "Ada", "email": "not-an-email", "message": "hello" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn listing_quotations_requires_authentication() {
        let server = test_server();

        server.get("/api/quotations").await.assert_status_unauthorized();
    }
}
