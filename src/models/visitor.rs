//! Visitor hit counter
//!
//! A single-row counter. The increment is one atomic statement, so
//! concurrent hits cannot lose updates the way a read-then-write would.

use sqlx::PgPool;

/// Increment the counter and return the new total
///
/// # Errors
///
/// Returns error if the query fails.
pub async fn increment(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO visitors (id, hits) VALUES (TRUE, 1) \
         ON CONFLICT (id) DO UPDATE SET hits = visitors.hits + 1 \
         RETURNING hits",
    )
    .fetch_one(pool)
    .await
}

/// Current total without incrementing
///
/// # Errors
///
/// Returns error if the query fails.
pub async fn current(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let hits: Option<i64> = sqlx::query_scalar("SELECT hits FROM visitors WHERE id = TRUE")
        .fetch_optional(pool)
        .await?;

    Ok(hits.unwrap_or(0))
}
