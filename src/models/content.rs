//! Blog and project content
//!
//! Blogs and projects share one shape (title, description, hosted image),
//! so they live in a single table discriminated by [`ContentKind`]. The
//! image host's delete token rides along so removal can ask the host to
//! discard the file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Which content collection an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Blog post
    Blog,
    /// Portfolio project
    Project,
}

impl ContentKind {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Project => "project",
        }
    }

    /// Human label for error messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Project => "Project",
        }
    }
}

impl TryFrom<String> for ContentKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "blog" => Ok(Self::Blog),
            "project" => Ok(Self::Project),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// A blog post or project entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Primary key
    pub id: i64,
    /// Collection discriminator
    #[sqlx(try_from = "String")]
    pub kind: ContentKind,
    /// Title
    pub title: String,
    /// Body/description
    pub description: String,
    /// Hosted image URL
    pub image_url: Option<String>,
    /// Image host delete token, kept server-side
    #[serde(skip_serializing)]
    pub image_delete_token: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

const CONTENT_COLUMNS: &str =
    "id, kind, title, description, image_url, image_delete_token, created_at, updated_at";

impl ContentItem {
    /// Items of one kind, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(pool: &PgPool, kind: ContentKind) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE kind = $1 ORDER BY created_at DESC"
        ))
        .bind(kind.as_str())
        .fetch_all(pool)
        .await
    }

    /// Find one item by kind and id
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find(
        pool: &PgPool,
        kind: ContentKind,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE kind = $1 AND id = $2"
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Create an item
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn create(
        pool: &PgPool,
        kind: ContentKind,
        title: &str,
        description: &str,
        image_url: Option<&str>,
        image_delete_token: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO content_items (kind, title, description, image_url, image_delete_token) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(kind.as_str())
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(image_delete_token)
        .fetch_one(pool)
        .await
    }

    /// Update an item; image fields change only when a new image was given
    ///
    /// # Errors
    ///
    /// Returns error if the query fails; `RowNotFound` when the item is
    /// gone.
    pub async fn update(
        pool: &PgPool,
        kind: ContentKind,
        id: i64,
        title: &str,
        description: &str,
        image_url: Option<&str>,
        image_delete_token: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE content_items SET \
                 title = $3, \
                 description = $4, \
                 image_url = COALESCE($5, image_url), \
                 image_delete_token = COALESCE($6, image_delete_token), \
                 updated_at = NOW() \
             WHERE kind = $1 AND id = $2 \
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(kind.as_str())
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(image_delete_token)
        .fetch_one(pool)
        .await
    }

    /// Delete an item, returning the deleted row for image cleanup
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn delete(
        pool: &PgPool,
        kind: ContentKind,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "DELETE FROM content_items WHERE kind = $1 AND id = $2 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_to_db_representation() {
        assert_eq!(ContentKind::Blog.as_str(), "blog");
        assert_eq!(ContentKind::Project.as_str(), "project");
        assert_eq!(
            ContentKind::try_from("project".to_string()).unwrap(),
            ContentKind::Project
        );
        assert!(ContentKind::try_from("page".to_string()).is_err());
    }

    #[test]
    fn delete_token_never_serializes() {
        let item = ContentItem {
            id: 1,
            kind: ContentKind::Blog,
            title: "t".to_string(),
            description: "d".to_string(),
            image_url: Some("https://img.example/a.png".to_string()),
            image_delete_token: Some("secret".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("imageDeleteToken").is_none());
        assert_eq!(json["imageUrl"], "https://img.example/a.png");
    }
}
