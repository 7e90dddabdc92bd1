//! User accounts
//!
//! The only entity with a real lifecycle: created on first successful OAuth
//! exchange (or first profile save), mutated by profile saves and admin
//! updates, never deleted. Exactly one row exists per external provider
//! identifier, enforced by the unique index; see [`User::find_or_create`]
//! for how concurrent first logins resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::oauth::ProviderProfile;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account (default)
    User,
    /// Administrator
    Admin,
}

impl UserRole {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the database representation
    ///
    /// # Errors
    ///
    /// Returns the unrecognized value.
    pub fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key; what session tokens carry
    pub id: i64,
    /// External provider identifier, unique and immutable
    pub provider_user_id: String,
    /// Display name from the provider
    pub display_name: String,
    /// Full name, editable via profile save
    pub full_name: String,
    /// Avatar URL from the provider
    pub picture_url: Option<String>,
    /// Status message from the provider
    pub status_message: Option<String>,
    /// Email; not unique, empty string when never supplied
    pub email: String,
    /// Account role
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    /// True once name, address and phone have all been supplied
    pub profile_completed: bool,
    /// Postal address
    pub address: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Creation time, set once
    pub created_at: DateTime<Utc>,
    /// Advances on every persisted mutation
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, provider_user_id, display_name, full_name, picture_url, \
     status_message, email, role, profile_completed, address, phone, created_at, updated_at";

impl User {
    /// Find a user by primary key
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find a user by external provider identifier
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_provider_id(
        pool: &PgPool,
        provider_user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider_user_id = $1"
        ))
        .bind(provider_user_id)
        .fetch_optional(pool)
        .await
    }

    /// Find a user by email
    ///
    /// Emails are not unique; the oldest match wins.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Find-or-create a user from a resolved provider profile
    ///
    /// Existing accounts come back unchanged; repeat logins never overwrite
    /// profile fields. A new account defaults display and full name to
    /// "Anonymous" when the provider omits a display name, and email to the
    /// empty string.
    ///
    /// Two concurrent first logins race to insert; `ON CONFLICT DO NOTHING`
    /// makes the loser's insert report zero rows, after which the winner's
    /// row is re-read and returned.
    ///
    /// # Errors
    ///
    /// Returns error if a query fails, or [`sqlx::Error::RowNotFound`] in
    /// the unreachable case where neither insert nor re-read produced a row.
    pub async fn find_or_create(
        pool: &PgPool,
        profile: &ProviderProfile,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_provider_id(pool, &profile.user_id).await? {
            return Ok(existing);
        }

        let name = profile
            .display_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string());
        let email = profile.email.clone().unwrap_or_default();

        let inserted = sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO users (provider_user_id, display_name, full_name, picture_url, \
                                status_message, email) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (provider_user_id) DO NOTHING \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.user_id)
        .bind(&name)
        .bind(&name)
        .bind(&profile.picture_url)
        .bind(&profile.status_message)
        .bind(&email)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(user) => Ok(user),
            // Someone else just created it; re-read instead of failing.
            None => Self::find_by_provider_id(pool, &profile.user_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Save profile fields, creating the account if it does not exist yet
    ///
    /// Sets `profile_completed = true`: this operation requires name,
    /// address and phone, which is exactly the flag's definition. Idempotent
    /// for identical input.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn save_profile(
        pool: &PgPool,
        provider_user_id: &str,
        name: &str,
        address: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO users (provider_user_id, display_name, full_name, email, address, \
                                phone, profile_completed) \
             VALUES ($1, $2, $2, COALESCE($3, ''), $4, $5, TRUE) \
             ON CONFLICT (provider_user_id) DO UPDATE SET \
                 full_name = EXCLUDED.full_name, \
                 address = EXCLUDED.address, \
                 phone = EXCLUDED.phone, \
                 email = COALESCE($3, users.email), \
                 profile_completed = TRUE, \
                 updated_at = NOW() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(provider_user_id)
        .bind(name)
        .bind(email)
        .bind(address)
        .bind(phone)
        .fetch_one(pool)
        .await
    }

    /// Admin update: role and the profile-completed override
    ///
    /// `profile_completed` is applied verbatim when given, independent of
    /// whether the underlying fields are populated.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails; `RowNotFound` when the user does
    /// not exist.
    pub async fn admin_update(
        pool: &PgPool,
        id: i64,
        role: Option<UserRole>,
        profile_completed: Option<bool>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE users SET \
                 role = COALESCE($2, role), \
                 profile_completed = COALESCE($3, profile_completed), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role.map(UserRole::as_str))
        .bind(profile_completed)
        .fetch_one(pool)
        .await
    }

    /// Count accounts created inside a time range
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
            "SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_db_representation() {
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert!(UserRole::from_str("root").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), r#""admin""#);
        let parsed: UserRole = serde_json::from_str(r#""user""#).unwrap();
        assert_eq!(parsed, UserRole::User);
    }
}
