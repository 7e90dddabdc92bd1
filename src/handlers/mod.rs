//! HTTP route handlers
//!
//! One module per route family. Every handler follows the same shape:
//! deserialize a typed request, validate, run one or two queries, map
//! failures into [`crate::error::AppError`], return JSON.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod orders;
pub mod profile;
pub mod quotations;
pub mod reports;
pub mod visitors;

use crate::error::AppError;

/// Map `RowNotFound` to a 404 with a route-specific message, everything
/// else to a database error
pub(crate) fn not_found_as(err: sqlx::Error, message: &str) -> AppError {
    match err {
        sqlx::Error::RowNotFound => AppError::NotFound(message.to_string()),
        other => AppError::Database(other),
    }
}
