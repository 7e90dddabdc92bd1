//! Shopping carts
//!
//! One cart per user identifier, stored as a JSONB items document and
//! replaced wholesale on save. Last write wins; there is no merging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A user's cart
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owning user identifier (as supplied by the client)
    pub user_id: String,
    /// Items document
    pub items: serde_json::Value,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last replacement time
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Fetch a user's cart
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT user_id, items, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Replace a user's cart wholesale
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn replace(
        pool: &PgPool,
        user_id: &str,
        items: &serde_json::Value,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO carts (user_id, items) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = NOW() \
             RETURNING user_id, items, created_at, updated_at",
        )
        .bind(user_id)
        .bind(items)
        .fetch_one(pool)
        .await
    }
}
