//! Feed ingestion pipeline for gator.
//!
//! Orchestrates fetch, validate, and persist for a single feed. The
//! feed is marked fetched whether or not the fetch succeeded so the
//! round-robin schedule keeps moving past failing feeds.

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::db::{Database, Feed, FeedRepository, NewPost, PostRepository};
use crate::rss::fetcher::RssFetcher;
use crate::rss::types::ParsedItem;
use crate::rss::validator::filter_valid;
use crate::Result;

/// Outcome of ingesting one feed.
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// Number of valid items for which a post insert was attempted.
    pub attempted: usize,
    /// Number of posts actually created (duplicates excluded).
    pub created: usize,
    /// Fetch or format error encountered, if any.
    pub error: Option<String>,
}

/// Ingest a single feed: fetch, validate, persist, mark fetched.
///
/// Fetch and format failures are recorded in the result rather than
/// returned; only storage failures propagate as errors.
pub async fn ingest_feed(db: &Database, fetcher: &RssFetcher, feed: &Feed) -> Result<IngestResult> {
    debug!("Ingesting feed {}: {}", feed.id, feed.url);

    let mut result = IngestResult::default();

    match fetcher.fetch(&feed.url).await {
        Ok(parsed) => {
            let items = filter_valid(parsed.items);
            let post_repo = PostRepository::new(db.pool());

            for item in items {
                result.attempted += 1;
                let post = post_from_item(feed.id, item);
                match post_repo.create_if_absent(&post).await {
                    Ok(Some(_)) => result.created += 1,
                    Ok(None) => {} // Already stored
                    Err(e) => {
                        error!("Failed to store post {} for feed {}: {}", post.url, feed.id, e);
                    }
                }
            }
        }
        Err(e) => {
            warn!("Failed to fetch feed {}: {}", feed.url, e);
            result.error = Some(e.to_string());
        }
    }

    // Marked fetched even on failure; the selection query must not
    // keep returning a permanently broken feed.
    FeedRepository::new(db.pool()).mark_fetched(feed.id).await?;

    Ok(result)
}

/// Build a post from a validated item.
fn post_from_item(feed_id: i64, item: ParsedItem) -> NewPost {
    NewPost {
        title: item.title.unwrap_or_default(),
        url: item.link.unwrap_or_default(),
        description: item.description.unwrap_or_default(),
        published_at: parse_pub_date(item.pub_date.as_deref()),
        feed_id,
    }
}

/// Parse an item's publication date.
///
/// RSS dates are nominally RFC 2822 but RFC 3339 appears in the wild.
/// An unparsable or missing date maps to the zero timestamp rather
/// than failing the item.
fn parse_pub_date(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
