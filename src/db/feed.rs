//! Feed model and repository for gator.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::{GatorError, Result};

/// A registered feed.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Unique feed ID.
    pub id: i64,
    /// Display name for the feed.
    pub name: String,
    /// Feed URL (globally unique).
    pub url: String,
    /// ID of the user who registered the feed.
    pub user_id: i64,
    /// Last time the feed was ingested, if ever.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was registered.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data for registering a new feed.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Display name for the feed.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// ID of the registering user.
    pub user_id: i64,
}

impl NewFeed {
    /// Create a new feed registration.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// A feed together with the name of the user who registered it.
#[derive(Debug, Clone)]
pub struct FeedWithOwner {
    /// The feed.
    pub feed: Feed,
    /// Name of the registering user.
    pub owner_name: String,
}

/// Row type for feeds from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    name: String,
    url: String,
    user_id: i64,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_datetime(&s)),
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for feeds joined with their owner's name.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    id: i64,
    name: String,
    url: String,
    user_id: i64,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
    owner_name: String,
}

impl From<FeedWithOwnerRow> for FeedWithOwner {
    fn from(row: FeedWithOwnerRow) -> Self {
        FeedWithOwner {
            feed: Feed {
                id: row.id,
                name: row.name,
                url: row.url,
                user_id: row.user_id,
                last_fetched_at: row.last_fetched_at.and_then(|s| parse_datetime(&s)),
                created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
                updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
            },
            owner_name: row.owner_name,
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new feed.
    pub async fn create(&self, feed: &NewFeed) -> Result<Feed> {
        let result = sqlx::query("INSERT INTO feeds (name, url, user_id) VALUES (?, ?, ?)")
            .bind(&feed.name)
            .bind(&feed.url)
            .bind(feed.user_id)
            .execute(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed".to_string()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds with their owners' names, in registration order.
    pub async fn list_with_owners(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(
            "SELECT f.id, f.name, f.url, f.user_id, f.last_fetched_at,
                    f.created_at, f.updated_at, u.name AS owner_name
             FROM feeds f
             JOIN users u ON u.id = f.user_id
             ORDER BY f.id ASC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FeedWithOwner::from).collect())
    }

    /// Select the feed that has gone longest without a fetch.
    ///
    /// Feeds that have never been fetched sort first.
    pub async fn get_next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds
             ORDER BY last_fetched_at ASC NULLS FIRST
             LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Record a fetch attempt against the feed.
    ///
    /// Sets both last_fetched_at and updated_at to the current time.
    pub async fn mark_fetched(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE feeds
             SET last_fetched_at = datetime('now'), updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
