//! Polling scheduler for gator.
//!
//! Repeatedly ingests the feed that has gone longest without a fetch,
//! sleeping for a configured interval between ticks. Cancellation
//! interrupts a pending sleep immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::db::{Database, FeedRepository};
use crate::rss::fetcher::RssFetcher;
use crate::rss::ingest::ingest_feed;
use crate::{GatorError, Result};

/// Parse an aggregation interval like "500ms", "2s", "3m", or "1h".
///
/// The magnitude must be a plain integer and the suffix one of ms, s,
/// m, or h; anything else is a configuration error.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let (magnitude, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1u64)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else {
        return Err(GatorError::Config(format!("duration not valid: {}", s)));
    };

    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatorError::Config(format!("duration not valid: {}", s)));
    }

    let value: u64 = magnitude
        .parse()
        .map_err(|_| GatorError::Config(format!("duration not valid: {}", s)))?;

    Ok(Duration::from_millis(value * unit_ms))
}

/// Feed aggregation loop.
///
/// Processes exactly one feed per tick; throughput is bounded by the
/// configured interval.
pub struct Aggregator {
    db: Arc<Database>,
    fetcher: RssFetcher,
    interval: Duration,
}

impl Aggregator {
    /// Create a new aggregator with the given database and interval.
    pub fn new(db: Arc<Database>, interval: Duration) -> Result<Self> {
        Ok(Self {
            db,
            fetcher: RssFetcher::new()?,
            interval,
        })
    }

    /// Run the aggregation loop until the cancellation signal fires.
    ///
    /// Per-tick errors are logged and swallowed; they never stop the
    /// loop.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!("Aggregator started (interval: {:?})", self.interval);

        loop {
            self.tick().await;

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = cancel.changed() => {
                    info!("Aggregator stopping");
                    break;
                }
            }
        }
    }

    /// Ingest the feed that has gone longest without a fetch.
    async fn tick(&self) {
        let feed = match FeedRepository::new(self.db.pool()).get_next_to_fetch().await {
            Ok(Some(feed)) => feed,
            Ok(None) => {
                debug!("No feeds registered, nothing to fetch");
                return;
            }
            Err(e) => {
                error!("Failed to select next feed: {}", e);
                return;
            }
        };

        match ingest_feed(&self.db, &self.fetcher, &feed).await {
            Ok(result) => {
                if let Some(err) = &result.error {
                    warn!("Feed {} fetch failed: {}", feed.url, err);
                } else if result.created > 0 {
                    info!("Feed {}: {} new post(s)", feed.url, result.created);
                } else {
                    debug!("Feed {}: no new posts", feed.url);
                }
            }
            Err(e) => {
                error!("Failed to ingest feed {}: {}", feed.url, e);
            }
        }
    }
}
