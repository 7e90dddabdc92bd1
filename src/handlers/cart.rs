//! Cart read/replace

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::models::Cart;
use crate::state::AppState;

/// Cart lookup query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    /// Owning user identifier
    pub user_id: String,
}

/// Cart payload, both directions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    /// Owning user identifier
    pub user_id: String,
    /// Items document
    pub cart_items: serde_json::Value,
}

/// GET /api/cart?userId=...
///
/// An absent cart reads as an empty one.
///
/// # Errors
///
/// 500 on database failure.
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = Cart::find(state.pool(), &query.user_id).await?;

    Ok(Json(match cart {
        Some(cart) => CartResponse {
            user_id: cart.user_id,
            cart_items: cart.items,
        },
        None => CartResponse {
            user_id: query.user_id,
            cart_items: json!([]),
        },
    }))
}

/// Save-cart request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveCartRequest {
    /// Owning user identifier
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Items document; replaces the stored cart wholesale
    #[serde(default = "empty_items")]
    pub cart_items: serde_json::Value,
}

fn empty_items() -> serde_json::Value {
    json!([])
}

/// POST /api/cart
///
/// Last write wins; there is no merging of concurrent saves.
///
/// # Errors
///
/// 400 on a missing `userId`, 500 on database failure.
pub async fn save_cart(
    State(state): State<AppState>,
    Json(request): Json<SaveCartRequest>,
) -> Result<Json<CartResponse>, AppError> {
    request.validate()?;

    let cart = Cart::replace(state.pool(), &request.user_id, &request.cart_items).await?;

    Ok(Json(CartResponse {
        user_id: cart.user_id,
        cart_items: cart.items,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn save_cart_requires_user_id() {
        let server = test_server();

        let response = server
            .post("/api/cart")
            .json(&json!({ "cartItems": [{ "productId": 1, "qty": 2 }] }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn get_cart_requires_user_id_query() {
        let server = test_server();

        let response = server.get("/api/cart").await;
        response.assert_status_bad_request();
    }
}
