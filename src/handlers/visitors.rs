//! Visitor counter

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::models::visitor;
use crate::state::AppState;

/// Counter payload
#[derive(Debug, Serialize)]
pub struct VisitorCount {
    /// Total recorded hits
    pub count: i64,
}

/// POST /api/visitors
///
/// Records a hit and returns the new total.
///
/// # Errors
///
/// 500 on database failure.
pub async fn hit(State(state): State<AppState>) -> Result<Json<VisitorCount>, AppError> {
    let count = visitor::increment(state.pool()).await?;
    Ok(Json(VisitorCount { count }))
}

/// GET /api/visitors
///
/// Current total without recording a hit.
///
/// # Errors
///
/// 500 on database failure.
pub async fn current(State(state): State<AppState>) -> Result<Json<VisitorCount>, AppError> {
    let count = visitor::current(state.pool()).await?;
    Ok(Json(VisitorCount { count }))
}
