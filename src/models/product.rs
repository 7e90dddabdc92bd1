//! Product and service catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A service category products hang off
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Primary key
    pub id: i64,
    /// Service name
    pub name: String,
    /// Description
    pub description: String,
    /// Illustration URL
    pub image_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// All services
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, description, image_url, created_at, updated_at \
             FROM services ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Primary key
    pub id: i64,
    /// Owning service, when any
    pub service_id: Option<i64>,
    /// Product name
    pub name: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Illustration URL
    pub image_url: Option<String>,
    /// Units in stock, never negative
    pub stock: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str =
    "id, service_id, name, description, price, image_url, stock, created_at, updated_at";

impl Product {
    /// Products, optionally filtered by service
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(pool: &PgPool, service_id: Option<i64>) -> Result<Vec<Self>, sqlx::Error> {
        match service_id {
            Some(service_id) => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE service_id = $1 ORDER BY id"
                ))
                .bind(service_id)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Find a product by primary key
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Persist a new stock level
    ///
    /// # Errors
    ///
    /// Returns error if the query fails; `RowNotFound` when the product is
    /// gone.
    pub async fn set_stock(pool: &PgPool, id: i64, stock: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1 RETURNING stock",
        )
        .bind(id)
        .bind(stock)
        .fetch_one(pool)
        .await
    }

    /// Products at or below a stock threshold
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_low_stock(pool: &PgPool, threshold: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock <= $1 ORDER BY stock, id"
        ))
        .bind(threshold)
        .fetch_all(pool)
        .await
    }
}

/// Apply a stock change, clamping the result at zero
///
/// A negative change larger than the current stock yields 0, never a
/// negative level.
#[must_use]
pub fn clamp_stock(current: i64, change: i64) -> i64 {
    current.saturating_add(change).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_change_larger_than_stock_clamps_to_zero() {
        assert_eq!(clamp_stock(10, -100), 0);
    }

    #[test]
    fn ordinary_changes_apply() {
        assert_eq!(clamp_stock(10, -3), 7);
        assert_eq!(clamp_stock(10, 5), 15);
        assert_eq!(clamp_stock(0, 0), 0);
    }

    proptest! {
        #[test]
        fn stock_never_goes_negative(current in 0i64..1_000_000, change in -1_000_000i64..1_000_000) {
            let next = clamp_stock(current, change);
            prop_assert!(next >= 0);
            if change >= 0 {
                prop_assert_eq!(next, current + change);
            } else {
                prop_assert_eq!(next, (current + change).max(0));
            }
        }
    }
}
