//! gator - a personal RSS feed aggregator
//!
//! A command-line tool for registering users, following feeds, and
//! periodically polling followed feeds to ingest new posts.

pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod rss;

pub use command::{build_registry, logged_in, CommandRegistry, Context};
pub use config::{config_path, Config};
pub use db::{
    Database, Feed, FeedFollowInfo, FeedFollowRepository, FeedRepository, FeedWithOwner, NewFeed,
    NewPost, Post, PostRepository, PostWithFeed, User, UserRepository,
};
pub use error::{GatorError, Result};
pub use rss::{
    filter_valid, ingest_feed, parse_feed, parse_interval, Aggregator, IngestResult, ParsedFeed,
    ParsedItem, RssFetcher,
};
