//! Feed follow (subscription) repository for gator.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::{GatorError, Result};

/// A subscription joined with the user and feed names for display.
#[derive(Debug, Clone)]
pub struct FeedFollowInfo {
    /// Unique follow ID.
    pub id: i64,
    /// Subscribing user's name.
    pub user_name: String,
    /// Followed feed's name.
    pub feed_name: String,
    /// Followed feed's URL.
    pub feed_url: String,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

/// Row type for follows joined with user and feed names.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowInfoRow {
    id: i64,
    user_name: String,
    feed_name: String,
    feed_url: String,
    created_at: String,
}

impl From<FeedFollowInfoRow> for FeedFollowInfo {
    fn from(row: FeedFollowInfoRow) -> Self {
        FeedFollowInfo {
            id: row.id,
            user_name: row.user_name,
            feed_name: row.feed_name,
            feed_url: row.feed_url,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe a user to the feed registered under the given URL.
    pub async fn create(&self, user_id: i64, feed_url: &str) -> Result<FeedFollowInfo> {
        let feed_id: Option<i64> = sqlx::query_scalar("SELECT id FROM feeds WHERE url = ?")
            .bind(feed_url)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        let feed_id =
            feed_id.ok_or_else(|| GatorError::NotFound(format!("feed with url {}", feed_url)))?;

        let result = sqlx::query("INSERT INTO feed_follows (user_id, feed_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed follow".to_string()))
    }

    /// Get a follow by ID with its joined names.
    async fn get_by_id(&self, id: i64) -> Result<Option<FeedFollowInfo>> {
        let row = sqlx::query_as::<_, FeedFollowInfoRow>(
            "SELECT ff.id, u.name AS user_name, f.name AS feed_name,
                    f.url AS feed_url, ff.created_at
             FROM feed_follows ff
             JOIN users u ON u.id = ff.user_id
             JOIN feeds f ON f.id = ff.feed_id
             WHERE ff.id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(FeedFollowInfo::from))
    }

    /// Check whether a user follows the feed with the given URL.
    pub async fn exists(&self, user_id: i64, feed_url: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM feed_follows ff
                JOIN feeds f ON f.id = ff.feed_id
                WHERE ff.user_id = ? AND f.url = ?
             )",
        )
        .bind(user_id)
        .bind(feed_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Remove a user's subscription to the feed with the given URL.
    ///
    /// Returns true if a subscription was removed.
    pub async fn delete(&self, feed_url: &str, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM feed_follows
             WHERE user_id = ?
               AND feed_id IN (SELECT id FROM feeds WHERE url = ?)",
        )
        .bind(user_id)
        .bind(feed_url)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's subscriptions, in subscription order.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<FeedFollowInfo>> {
        let rows = sqlx::query_as::<_, FeedFollowInfoRow>(
            "SELECT ff.id, u.name AS user_name, f.name AS feed_name,
                    f.url AS feed_url, ff.created_at
             FROM feed_follows ff
             JOIN users u ON u.id = ff.user_id
             JOIN feeds f ON f.id = ff.feed_id
             WHERE ff.user_id = ?
             ORDER BY ff.id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FeedFollowInfo::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, FeedRepository, NewFeed, UserRepository};

    async fn setup() -> (Database, i64) {
        let db = Database::connect_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool()).create("alice").await.unwrap();
        FeedRepository::new(db.pool())
            .create(&NewFeed::new("Example", "https://example.com/feed.xml", user.id))
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_follow() {
        let (db, user_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        let follow = repo
            .create(user_id, "https://example.com/feed.xml")
            .await
            .unwrap();
        assert_eq!(follow.user_name, "alice");
        assert_eq!(follow.feed_name, "Example");
    }

    #[tokio::test]
    async fn test_create_follow_unknown_feed() {
        let (db, user_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        let result = repo.create(user_id, "https://nowhere.invalid/feed.xml").await;
        assert!(matches!(result, Err(GatorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_follow_rejected() {
        let (db, user_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        repo.create(user_id, "https://example.com/feed.xml")
            .await
            .unwrap();
        let result = repo.create(user_id, "https://example.com/feed.xml").await;
        assert!(matches!(result, Err(GatorError::Database(_))));
    }

    #[tokio::test]
    async fn test_follow_unfollow_round_trip() {
        let (db, user_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        repo.create(user_id, "https://example.com/feed.xml")
            .await
            .unwrap();
        assert!(repo.exists(user_id, "https://example.com/feed.xml").await.unwrap());

        assert!(repo
            .delete("https://example.com/feed.xml", user_id)
            .await
            .unwrap());
        assert!(!repo.exists(user_id, "https://example.com/feed.xml").await.unwrap());

        // Deleting again removes nothing.
        assert!(!repo
            .delete("https://example.com/feed.xml", user_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let (db, user_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        assert!(repo.list_for_user(user_id).await.unwrap().is_empty());

        repo.create(user_id, "https://example.com/feed.xml")
            .await
            .unwrap();

        let follows = repo.list_for_user(user_id).await.unwrap();
        assert_eq!(follows.len(), 1);
        assert_eq!(follows[0].feed_url, "https://example.com/feed.xml");
    }
}
