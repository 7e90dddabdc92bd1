//! Quotation requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A quotation request submitted from the site
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    /// Primary key
    pub id: i64,
    /// Requester name
    pub name: String,
    /// Requester email
    pub email: String,
    /// Requester phone
    pub phone: String,
    /// Free-form message
    pub message: String,
    /// Service the request is about, when any
    pub service_id: Option<i64>,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Store a quotation request
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        phone: &str,
        message: &str,
        service_id: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO quotations (name, email, phone, message, service_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, phone, message, service_id, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(message)
        .bind(service_id)
        .fetch_one(pool)
        .await
    }

    /// All quotation requests, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, email, phone, message, service_id, created_at \
             FROM quotations ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Count requests submitted inside a time range
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn count_created_between(
        pool: &PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM quotations WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
}
