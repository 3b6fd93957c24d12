//! Command handlers for gator.

use tokio::sync::watch;
use tracing::error;

use super::middleware::logged_in;
use super::registry::{handler, CommandRegistry};
use super::Context;
use crate::config::Config;
use crate::db::{
    FeedFollowRepository, FeedRepository, NewFeed, PostRepository, User, UserRepository,
};
use crate::rss::scheduler::{parse_interval, Aggregator};
use crate::{GatorError, Result};

/// Build the registry with every gator command.
pub fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register("login", handler(login));
    registry.register("register", handler(register));
    registry.register("reset", handler(reset));
    registry.register("users", handler(users));
    registry.register("agg", handler(agg));
    registry.register("addfeed", logged_in(add_feed));
    registry.register("feeds", handler(feeds));
    registry.register("follow", logged_in(follow));
    registry.register("following", logged_in(following));
    registry.register("unfollow", logged_in(unfollow));
    registry.register("browse", logged_in(browse));
    registry
}

/// Fetch a required positional argument.
fn require_arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| GatorError::Validation(format!("missing {} argument", name)))
}

/// `login <name>`: set the current user.
async fn login(ctx: Context, args: Vec<String>) -> Result<()> {
    let name = require_arg(&args, 0, "username")?;

    let user = UserRepository::new(ctx.db.pool())
        .get_by_name(name)
        .await?
        .ok_or_else(|| GatorError::UserNotFound(name.to_string()))?;

    Config::set_current_user(&ctx.config_path, &user.name)?;
    println!("Logged in as {}", user.name);
    Ok(())
}

/// `register <name>`: create a user and log in as them.
async fn register(ctx: Context, args: Vec<String>) -> Result<()> {
    let name = require_arg(&args, 0, "username")?;

    let repo = UserRepository::new(ctx.db.pool());
    if repo.get_by_name(name).await?.is_some() {
        return Err(GatorError::Validation(format!(
            "user {} already exists",
            name
        )));
    }

    let user = repo.create(name).await?;
    Config::set_current_user(&ctx.config_path, &user.name)?;
    println!("User {} created", user.name);
    Ok(())
}

/// `reset`: delete all users (and, through cascades, everything else).
async fn reset(ctx: Context, _args: Vec<String>) -> Result<()> {
    let removed = UserRepository::new(ctx.db.pool()).reset().await?;
    println!("Removed {} user(s)", removed);
    Ok(())
}

/// `users`: list registered users, marking the current one.
async fn users(ctx: Context, _args: Vec<String>) -> Result<()> {
    let users = UserRepository::new(ctx.db.pool()).list_all().await?;
    let current = Config::read_current_user(&ctx.config_path)?;

    for user in users {
        if current.as_deref() == Some(user.name.as_str()) {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

/// `agg <interval>`: run the polling scheduler until interrupted.
async fn agg(ctx: Context, args: Vec<String>) -> Result<()> {
    let raw = require_arg(&args, 0, "interval")?;
    let interval = parse_interval(raw)?;

    println!("Collecting feeds every {}", raw);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("Failed to listen for ctrl-c");
        }
        let _ = cancel_tx.send(true);
    });

    let aggregator = Aggregator::new(ctx.db.clone(), interval)?;
    aggregator.run(cancel_rx).await;
    Ok(())
}

/// `addfeed <name> <url>`: register a feed and follow it.
async fn add_feed(ctx: Context, user: User, args: Vec<String>) -> Result<()> {
    let name = require_arg(&args, 0, "feed name")?;
    let url = require_arg(&args, 1, "feed url")?;

    let feed = FeedRepository::new(ctx.db.pool())
        .create(&NewFeed::new(name, url, user.id))
        .await?;
    let follow = FeedFollowRepository::new(ctx.db.pool())
        .create(user.id, &feed.url)
        .await?;

    println!("Feed {} registered at {}", feed.name, feed.url);
    println!("{} is now following {}", follow.user_name, follow.feed_name);
    Ok(())
}

/// `feeds`: list every registered feed and who registered it.
async fn feeds(ctx: Context, _args: Vec<String>) -> Result<()> {
    let feeds = FeedRepository::new(ctx.db.pool()).list_with_owners().await?;
    for entry in feeds {
        println!(
            "* {} {} (added by {})",
            entry.feed.name, entry.feed.url, entry.owner_name
        );
    }
    Ok(())
}

/// `follow <url>`: subscribe the current user to a registered feed.
async fn follow(ctx: Context, user: User, args: Vec<String>) -> Result<()> {
    let url = require_arg(&args, 0, "feed url")?;

    let follow = FeedFollowRepository::new(ctx.db.pool())
        .create(user.id, url)
        .await?;

    println!("{} is now following {}", follow.user_name, follow.feed_name);
    Ok(())
}

/// `following`: list the current user's subscriptions.
async fn following(ctx: Context, user: User, _args: Vec<String>) -> Result<()> {
    let follows = FeedFollowRepository::new(ctx.db.pool())
        .list_for_user(user.id)
        .await?;

    for follow in follows {
        println!("* {}", follow.feed_name);
    }
    Ok(())
}

/// `unfollow <url>`: remove the current user's subscription.
async fn unfollow(ctx: Context, user: User, args: Vec<String>) -> Result<()> {
    let url = require_arg(&args, 0, "feed url")?;

    let removed = FeedFollowRepository::new(ctx.db.pool())
        .delete(url, user.id)
        .await?;
    if !removed {
        return Err(GatorError::Validation(format!("not following {}", url)));
    }

    println!("Unfollowed {}", url);
    Ok(())
}

/// `browse <limit>`: show recent posts from followed feeds.
async fn browse(ctx: Context, user: User, args: Vec<String>) -> Result<()> {
    let limit: i64 = require_arg(&args, 0, "limit")?
        .parse()
        .map_err(|_| GatorError::Validation("limit must be a positive integer".to_string()))?;
    if limit <= 0 {
        return Err(GatorError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }

    let posts = PostRepository::new(ctx.db.pool())
        .list_for_user(user.id, limit)
        .await?;

    for entry in posts {
        println!("{} ({})", entry.post.title, entry.feed_name);
        println!("  {}", entry.post.url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::sync::Arc;

    async fn test_context(dir: &tempfile::TempDir) -> Context {
        let db = Database::connect_in_memory().await.unwrap();
        Context::new(Arc::new(db), dir.path().join("config.json"))
    }

    #[test]
    fn test_registry_has_all_commands() {
        let registry = build_registry();
        for name in [
            "login",
            "register",
            "reset",
            "users",
            "agg",
            "addfeed",
            "feeds",
            "follow",
            "following",
            "unfollow",
            "browse",
        ] {
            assert!(registry.contains(name), "missing command: {}", name);
        }
        assert_eq!(registry.len(), 11);
    }

    #[tokio::test]
    async fn test_register_creates_and_logs_in() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;

        register(ctx.clone(), vec!["alice".to_string()]).await.unwrap();

        let user = UserRepository::new(ctx.db.pool())
            .get_by_name("alice")
            .await
            .unwrap();
        assert!(user.is_some());
        assert_eq!(
            Config::read_current_user(&ctx.config_path).unwrap(),
            Some("alice".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_rejects_existing_user() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;

        register(ctx.clone(), vec!["alice".to_string()]).await.unwrap();
        let result = register(ctx, vec!["alice".to_string()]).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;

        let result = login(ctx, vec!["nobody".to_string()]).await;
        assert!(matches!(result, Err(GatorError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_login_missing_argument() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;

        let result = login(ctx, Vec::new()).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_agg_rejects_bad_interval_before_looping() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;

        let result = agg(ctx, vec!["5x".to_string()]).await;
        assert!(matches!(result, Err(GatorError::Config(_))));
    }

    #[tokio::test]
    async fn test_browse_rejects_bad_limit() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir).await;
        let user = UserRepository::new(ctx.db.pool()).create("alice").await.unwrap();

        let result = browse(ctx.clone(), user.clone(), vec!["zero".to_string()]).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));

        let result = browse(ctx, user, vec!["0".to_string()]).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }
}
