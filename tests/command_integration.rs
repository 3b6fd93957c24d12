//! Integration tests for command dispatch and the login middleware.

use std::sync::Arc;

use gator::{
    build_registry, Config, Context, Database, FeedFollowRepository, GatorError, UserRepository,
};

async fn test_context(dir: &tempfile::TempDir) -> Context {
    let db = Database::connect_in_memory().await.unwrap();
    Context::new(Arc::new(db), dir.path().join("config.json"))
}

#[tokio::test]
async fn unknown_command_fails_and_registry_survives() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    let result = registry.run("bogus", ctx.clone(), Vec::new()).await;
    assert!(matches!(result, Err(GatorError::UnknownCommand(_))));

    // A known command still dispatches afterward.
    registry
        .run("register", ctx, vec!["alice".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn authenticated_command_without_login_fails_before_user_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    // No current user configured and an empty user table: NotLoggedIn,
    // not UserNotFound, proves the config gate fires first.
    let result = registry
        .run(
            "follow",
            ctx,
            vec!["https://example.com/feed.xml".to_string()],
        )
        .await;
    assert!(matches!(result, Err(GatorError::NotLoggedIn)));
}

#[tokio::test]
async fn authenticated_command_with_stale_login_reports_missing_user() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    Config::set_current_user(&ctx.config_path, "ghost").unwrap();

    let result = registry.run("following", ctx, Vec::new()).await;
    match result {
        Err(GatorError::UserNotFound(name)) => assert_eq!(name, "ghost"),
        other => panic!("expected user not found, got {:?}", other),
    }
}

#[tokio::test]
async fn register_addfeed_follow_unfollow_flow() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    registry
        .run("register", ctx.clone(), vec!["alice".to_string()])
        .await
        .unwrap();

    // addfeed registers the feed and follows it in one step.
    registry
        .run(
            "addfeed",
            ctx.clone(),
            vec![
                "Example Blog".to_string(),
                "https://example.com/feed.xml".to_string(),
            ],
        )
        .await
        .unwrap();

    let user = UserRepository::new(ctx.db.pool())
        .get_by_name("alice")
        .await
        .unwrap()
        .unwrap();
    let follows = FeedFollowRepository::new(ctx.db.pool())
        .list_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(follows.len(), 1);
    assert_eq!(follows[0].feed_name, "Example Blog");

    registry
        .run(
            "unfollow",
            ctx.clone(),
            vec!["https://example.com/feed.xml".to_string()],
        )
        .await
        .unwrap();

    assert!(FeedFollowRepository::new(ctx.db.pool())
        .list_for_user(user.id)
        .await
        .unwrap()
        .is_empty());

    // Unfollowing again is a validation error.
    let result = registry
        .run(
            "unfollow",
            ctx,
            vec!["https://example.com/feed.xml".to_string()],
        )
        .await;
    assert!(matches!(result, Err(GatorError::Validation(_))));
}

#[tokio::test]
async fn follow_requires_registered_feed() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    registry
        .run("register", ctx.clone(), vec!["alice".to_string()])
        .await
        .unwrap();

    let result = registry
        .run(
            "follow",
            ctx,
            vec!["https://nowhere.invalid/feed.xml".to_string()],
        )
        .await;
    assert!(matches!(result, Err(GatorError::NotFound(_))));
}

#[tokio::test]
async fn login_switches_current_user() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    registry
        .run("register", ctx.clone(), vec!["alice".to_string()])
        .await
        .unwrap();
    registry
        .run("register", ctx.clone(), vec!["bob".to_string()])
        .await
        .unwrap();
    assert_eq!(
        Config::read_current_user(&ctx.config_path).unwrap(),
        Some("bob".to_string())
    );

    registry
        .run("login", ctx.clone(), vec!["alice".to_string()])
        .await
        .unwrap();
    assert_eq!(
        Config::read_current_user(&ctx.config_path).unwrap(),
        Some("alice".to_string())
    );
}

#[tokio::test]
async fn reset_clears_users() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir).await;
    let registry = build_registry();

    registry
        .run("register", ctx.clone(), vec!["alice".to_string()])
        .await
        .unwrap();
    registry.run("reset", ctx.clone(), Vec::new()).await.unwrap();

    assert!(UserRepository::new(ctx.db.pool())
        .list_all()
        .await
        .unwrap()
        .is_empty());
}
