//! Post model and repository for gator.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::{GatorError, Result};

/// An ingested post.
#[derive(Debug, Clone)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Post URL (unique; the deduplication key).
    pub url: String,
    /// Post description.
    pub description: String,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Feed the post was ingested from.
    pub feed_id: i64,
    /// When the post was ingested.
    pub created_at: DateTime<Utc>,
}

/// Data for ingesting a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Post URL.
    pub url: String,
    /// Post description.
    pub description: String,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Source feed ID.
    pub feed_id: i64,
}

/// A post together with the name of its source feed.
#[derive(Debug, Clone)]
pub struct PostWithFeed {
    /// The post.
    pub post: Post,
    /// Name of the feed the post came from.
    pub feed_name: String,
}

/// Row type for posts from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostWithFeedRow {
    id: i64,
    title: String,
    url: String,
    description: String,
    published_at: String,
    feed_id: i64,
    created_at: String,
    feed_name: String,
}

impl From<PostWithFeedRow> for PostWithFeed {
    fn from(row: PostWithFeedRow) -> Self {
        PostWithFeed {
            post: Post {
                id: row.id,
                title: row.title,
                url: row.url,
                description: row.description,
                published_at: parse_datetime(&row.published_at)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                feed_id: row.feed_id,
                created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            },
            feed_name: row.feed_name,
        }
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post, ignoring it if a post with the same URL exists.
    ///
    /// Returns the new post's ID, or None if the URL was already stored.
    pub async fn create_if_absent(&self, post: &NewPost) -> Result<Option<i64>> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO posts (title, url, description, published_at, feed_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(post.published_at.to_rfc3339())
        .bind(post.feed_id)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            Ok(Some(result.last_insert_rowid()))
        } else {
            Ok(None) // Already stored
        }
    }

    /// Count all posts for a feed.
    pub async fn count_by_feed(&self, feed_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(count)
    }

    /// List posts from the feeds a user follows, newest first.
    pub async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<PostWithFeed>> {
        let rows = sqlx::query_as::<_, PostWithFeedRow>(
            "SELECT p.id, p.title, p.url, p.description, p.published_at,
                    p.feed_id, p.created_at, f.name AS feed_name
             FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             JOIN feeds f ON f.id = p.feed_id
             WHERE ff.user_id = ?
             ORDER BY p.published_at DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(PostWithFeed::from).collect())
    }
}
