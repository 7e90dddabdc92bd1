//! Product/service catalog and stock adjustment

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Authenticated;
use crate::error::AppError;
use crate::models::{product, Product, Service};
use crate::state::AppState;

/// Product list filter
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    /// Restrict to one service
    pub service_id: Option<i64>,
}

/// GET /api/products
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(
        Product::list(state.pool(), query.service_id).await?,
    ))
}

/// GET /api/products/{id}
///
/// # Errors
///
/// 404 when the product does not exist, 500 on database failure.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = Product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// GET /api/services
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(Service::list(state.pool()).await?))
}

/// Stock adjustment request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRequest {
    /// Product to adjust
    pub product_id: i64,
    /// Signed change; negative draws down
    pub change: i64,
    /// Client-reported actor, kept in the log; the session identity is
    /// authoritative
    pub user_id: Option<String>,
}

/// POST /api/products/stock
///
/// Applies the change with the result clamped at zero, never negative, and
/// responds with `{"<productId>": <new stock>}`.
///
/// # Errors
///
/// 401 without a valid session token, 404 for an unknown product, 500 on
/// database failure.
pub async fn update_stock(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(request): Json<StockUpdateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let current = Product::find_by_id(state.pool(), request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let next = product::clamp_stock(current.stock, request.change);
    let stored = Product::set_stock(state.pool(), request.product_id, next)
        .await
        .map_err(|e| super::not_found_as(e, "Product not found"))?;

    tracing::info!(
        product_id = request.product_id,
        change = request.change,
        stock = stored,
        user_id = user.id,
        reported_user = request.user_id.as_deref().unwrap_or(""),
        "stock adjusted"
    );

    let mut body = serde_json::Map::new();
    body.insert(request.product_id.to_string(), json!(stored));
    Ok(Json(serde_json::Value::Object(body)))
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn stock_update_requires_authentication() {
        let server = test_server();

        let response = server
            .post("/api/products/stock")
            .json(&json!({ "productId": 1, "change": -100, "userId": "u1" }))
            .await;

        response.assert_status_unauthorized();
    }
}
