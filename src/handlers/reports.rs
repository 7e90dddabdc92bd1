//! Admin reports
//!
//! Date-ranged aggregates over orders, users, quotations and stock. All
//! three routes require the admin role: an unauthenticated caller gets 401,
//! an authenticated non-admin gets 403, regardless of query content.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AdminOnly;
use crate::error::AppError;
use crate::models::order::DailyOrderTotal;
use crate::models::{Order, Product, Quotation, User};
use crate::state::AppState;

/// Date-range query, inclusive on both ends
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    /// First day of the range; epoch when omitted
    pub from: Option<NaiveDate>,
    /// Last day of the range; today when omitted
    pub to: Option<NaiveDate>,
}

/// Resolve the query into half-open UTC bounds `[start, end)`
fn range_bounds(query: &RangeQuery) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = query
        .from
        .map_or(DateTime::UNIX_EPOCH, |d| d.and_time(NaiveTime::MIN).and_utc());

    let end = query.to.map_or_else(Utc::now, |d| {
        d.checked_add_days(Days::new(1))
            .unwrap_or(d)
            .and_time(NaiveTime::MIN)
            .and_utc()
    });

    (start, end)
}

/// Summary report body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Orders placed in range (cancelled excluded)
    pub orders: i64,
    /// Revenue over those orders
    pub revenue: f64,
    /// Accounts created in range
    pub new_users: i64,
    /// Quotation requests in range
    pub quotations: i64,
}

/// GET /api/reports/summary (admin)
///
/// # Errors
///
/// 401/403 on auth failure, 500 on database failure.
pub async fn summary(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Query(query): Query<RangeQuery>,
) -> Result<Json<SummaryReport>, AppError> {
    let (from, to) = range_bounds(&query);

    let (orders, revenue) = Order::sales_summary(state.pool(), from, to).await?;
    let new_users = User::count_created_between(state.pool(), from, to).await?;
    let quotations = Quotation::count_created_between(state.pool(), from, to).await?;

    Ok(Json(SummaryReport {
        orders,
        revenue,
        new_users,
        quotations,
    }))
}

/// GET /api/reports/orders (admin)
///
/// Daily order count and revenue over the range.
///
/// # Errors
///
/// 401/403 on auth failure, 500 on database failure.
pub async fn orders(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailyOrderTotal>>, AppError> {
    let (from, to) = range_bounds(&query);
    Ok(Json(Order::daily_totals(state.pool(), from, to).await?))
}

/// Stock report query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    /// Products at or below this level are reported; defaults to 5
    pub threshold: Option<i64>,
}

/// GET /api/reports/stock (admin)
///
/// # Errors
///
/// 401/403 on auth failure, 500 on database failure.
pub async fn stock(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Query(query): Query<StockQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let threshold = query.threshold.unwrap_or(5);
    Ok(Json(Product::list_low_stock(state.pool(), threshold).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_server;

    #[tokio::test]
    async fn reports_reject_unauthenticated_callers() {
        let server = test_server();

        server.get("/api/reports/summary").await.assert_status_unauthorized();
        server.get("/api/reports/orders").await.assert_status_unauthorized();
        server.get("/api/reports/stock").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn reports_reject_garbage_tokens_regardless_of_query() {
        let server = test_server();

        let response = server
            .get("/api/reports/summary?from=2026-01-01&to=2026-01-31")
            .authorization_bearer("garbage")
            .await;

        response.assert_status_unauthorized();
    }

    #[test]
    fn range_defaults_to_epoch_and_now() {
        let (start, end) = range_bounds(&RangeQuery { from: None, to: None });
        assert_eq!(start, DateTime::UNIX_EPOCH);
        assert!(end <= Utc::now());
    }

    #[test]
    fn to_date_is_inclusive() {
        let query = RangeQuery {
            from: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
        };

        let (start, end) = range_bounds(&query);
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        // Half-open upper bound lands on the next midnight.
        assert_eq!(end.to_rfc3339(), "2026-02-01T00:00:00+00:00");
    }
}
