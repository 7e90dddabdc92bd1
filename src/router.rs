//! Route table and middleware stack

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{admin, auth, cart, catalog, content, orders, profile, quotations, reports, visitors};
use crate::state::AppState;

/// Uploads (multipart content forms) up to this many bytes.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Assemble the application router
#[must_use]
pub fn build(state: AppState) -> Router {
    let cors = cors_layer(&state.settings().server.allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/exchange-code", post(auth::exchange_code))
        .route("/api/save-profile", post(profile::save_profile))
        .route("/api/check-profile", post(profile::check_profile))
        .route("/api/cart", get(cart::get_cart).post(cart::save_cart))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/api/internal/orders/cancel-expired",
            post(orders::cancel_expired),
        )
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/stock", post(catalog::update_stock))
        .route("/api/products/{id}", get(catalog::get_product))
        .route("/api/services", get(catalog::list_services))
        .route("/api/blogs", get(content::list_blogs).post(content::create_blog))
        .route(
            "/api/blogs/{id}",
            get(content::get_blog)
                .put(content::update_blog)
                .delete(content::delete_blog),
        )
        .route(
            "/api/projects",
            get(content::list_projects).post(content::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(content::get_project)
                .put(content::update_project)
                .delete(content::delete_project),
        )
        .route(
            "/api/quotations",
            get(quotations::list_quotations).post(quotations::create_quotation),
        )
        .route("/api/visitors", get(visitors::current).post(visitors::hit))
        .route("/api/admin/users/{id}", put(admin::update_user))
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/orders", get(reports::orders))
        .route("/api/reports/stock", get(reports::stock))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use crate::testing::test_server;
    use serde_json::json;

    #[tokio::test]
    async fn health_answers_ok() {
        let server = test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let server = test_server();

        server.get("/api/nope").await.assert_status_not_found();
    }
}
