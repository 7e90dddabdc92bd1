//! Orders
//!
//! Orders keep their line items and customer details as JSONB documents and
//! carry a typed status. Order numbers come from the `order_counters`
//! sequence via an atomic upsert-increment.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Order lifecycle status
///
/// The typed enum is deliberate: only these three values can reach the
/// database, and the reporting queries aggregate over the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet handled
    Pending,
    /// Fulfilled
    Completed,
    /// Cancelled, by hand or by the expiry sweep
    Cancelled,
}

impl OrderStatus {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the database representation
    ///
    /// # Errors
    ///
    /// Returns the unrecognized value.
    pub fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

/// An order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Primary key
    pub id: i64,
    /// Human-facing sequential number
    pub order_number: i64,
    /// Owning user (database id)
    pub user_id: i64,
    /// Line items document
    pub items: serde_json::Value,
    /// Order total
    pub total: f64,
    /// Customer details document (shipping name, address, ...)
    pub customer: serde_json::Value,
    /// Payment method label
    pub payment_method: String,
    /// Lifecycle status
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, items, total, customer, payment_method, \
     status, created_at, updated_at";

impl Order {
    /// Create a pending order, drawing the next order number
    ///
    /// The counter increment and the insert are two statements with no
    /// transaction around them, like every other write in this service; a
    /// crash between them burns a number, nothing more.
    ///
    /// # Errors
    ///
    /// Returns error if a query fails.
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        items: &serde_json::Value,
        total: f64,
        customer: &serde_json::Value,
        payment_method: &str,
    ) -> Result<Self, sqlx::Error> {
        let order_number = next_order_number(pool).await?;

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO orders (order_number, user_id, items, total, customer, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_number)
        .bind(user_id)
        .bind(items)
        .bind(total)
        .bind(customer)
        .bind(payment_method)
        .fetch_one(pool)
        .await
    }

    /// Orders for one user, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All orders, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Order count and revenue inside a time range, cancelled excluded
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn sales_summary(
        pool: &PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(i64, f64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total), 0) FROM orders \
             WHERE status <> 'cancelled' AND created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    /// Per-day order count and revenue inside a time range
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn daily_totals(
        pool: &PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyOrderTotal>, sqlx::Error> {
        sqlx::query_as::<_, DailyOrderTotal>(
            "SELECT created_at::date AS day, COUNT(*) AS orders, \
                    COALESCE(SUM(total), 0) AS revenue \
             FROM orders \
             WHERE status <> 'cancelled' AND created_at >= $1 AND created_at < $2 \
             GROUP BY day ORDER BY day",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Cancel pending orders older than the TTL; returns how many
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn cancel_expired(pool: &PgPool, ttl_minutes: i64) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - Duration::minutes(ttl_minutes);

        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = NOW() \
             WHERE status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// One day's order count and revenue
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyOrderTotal {
    /// Calendar day (UTC)
    pub day: NaiveDate,
    /// Orders placed that day
    pub orders: i64,
    /// Revenue over those orders
    pub revenue: f64,
}

async fn next_order_number(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO order_counters (name, value) VALUES ('orders', 1) \
         ON CONFLICT (name) DO UPDATE SET value = order_counters.value + 1 \
         RETURNING value",
    )
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_representation() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn reporting_era_statuses_are_unrepresentable() {
        assert!(OrderStatus::from_str("confirmed").is_err());
        assert!(OrderStatus::from_str("delivered").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            r#""pending""#
        );
    }
}
