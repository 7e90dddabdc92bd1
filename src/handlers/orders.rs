//! Order placement, listing and the internal expiry sweep

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::extractors::session_token;
use crate::auth::Authenticated;
use crate::email::{self, Email};
use crate::error::AppError;
use crate::models::{Order, UserRole};
use crate::state::AppState;

/// Create-order request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Line items; must be a non-empty array
    #[serde(default)]
    pub items: serde_json::Value,
    /// Order total
    #[serde(default)]
    #[validate(range(min = 0.0, message = "total must not be negative"))]
    pub total: f64,
    /// Customer details (shipping name, address, ...)
    #[serde(default)]
    pub customer: serde_json::Value,
    /// Payment method label
    #[serde(default)]
    #[validate(length(min = 1, message = "paymentMethod is required"))]
    pub payment_method: String,
}

/// POST /api/orders
///
/// Creates a pending order for the authenticated caller and sends a
/// confirmation email when the account has one; email trouble is retried
/// once, then logged and swallowed; the order stands either way.
///
/// # Errors
///
/// 400 on invalid input, 401 without a valid session token, 500 on
/// database failure.
pub async fn create_order(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    request.validate()?;

    let item_count = request.items.as_array().map_or(0, Vec::len);
    if item_count == 0 {
        return Err(AppError::Validation(
            "items must be a non-empty array".to_string(),
        ));
    }

    let order = Order::create(
        state.pool(),
        user.id,
        &request.items,
        request.total,
        &request.customer,
        &request.payment_method,
    )
    .await?;

    tracing::info!(
        order_id = order.id,
        order_number = order.order_number,
        user_id = user.id,
        item_count,
        total = order.total,
        "order placed"
    );

    if !user.email.is_empty() {
        let confirmation = Email::new()
            .to(&user.email)
            .subject(format!("Order #{} received", order.order_number))
            .text(format!(
                "Hi {},\n\nwe received your order #{} over {:.2}. \
                 We will be in touch once it ships.\n",
                user.full_name, order.order_number, order.total
            ));

        if let Err(e) = email::send_with_retry(state.email(), confirmation).await {
            tracing::warn!(order_id = order.id, error = %e, "order confirmation email failed");
        }
    }

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
///
/// The caller's orders, newest first; admins see every order.
///
/// # Errors
///
/// 401 without a valid session token, 500 on database failure.
pub async fn list_orders(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = if user.role == UserRole::Admin {
        Order::list_all(state.pool()).await?
    } else {
        Order::list_for_user(state.pool(), user.id).await?
    };

    Ok(Json(orders))
}

/// Sweep outcome body
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    /// How many pending orders were cancelled
    pub cancelled: u64,
}

/// POST /api/internal/orders/cancel-expired
///
/// Guarded by the configured service token, not by user sessions; driven by
/// the in-process scheduler.
///
/// # Errors
///
/// 401 without the exact service token, 500 on database failure.
pub async fn cancel_expired(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SweepResponse>, AppError> {
    let presented = session_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing service token".to_string()))?;

    if presented != state.settings().scheduler.token {
        return Err(AppError::Unauthorized("Invalid service token".to_string()));
    }

    let ttl_minutes = state.settings().scheduler.order_ttl_minutes;
    let cancelled = Order::cancel_expired(state.pool(), ttl_minutes).await?;

    if cancelled > 0 {
        tracing::info!(cancelled, ttl_minutes, "expired pending orders cancelled");
    }

    Ok(Json(SweepResponse { cancelled }))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn create_order_requires_authentication() {
        let server = test_server();

        let response = server
            .post("/api/orders")
            .json(&json!({ "items": [{"productId": 1}], "total": 10.0, "paymentMethod": "card" }))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn list_orders_requires_authentication() {
        let server = test_server();

        let response = server.get("/api/orders").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn sweep_rejects_missing_token() {
        let server = test_server();

        let response = server.post("/api/internal/orders/cancel-expired").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn sweep_rejects_wrong_token() {
        let server = test_server();

        let response = server
            .post("/api/internal/orders/cancel-expired")
            .authorization_bearer("not-the-service-token")
            .await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Invalid service token" }));
    }
}
