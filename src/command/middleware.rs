//! Login middleware for gator.

use std::future::Future;

use super::registry::{CommandHandler, HandlerFuture};
use super::Context;
use crate::config::Config;
use crate::db::{User, UserRepository};
use crate::GatorError;
use crate::Result;

/// Wrap a handler that requires an authenticated user.
///
/// The returned handler reads the current user name from the persisted
/// configuration before touching storage: a missing name fails with
/// `NotLoggedIn` without ever querying the user table. The resolved
/// user is injected as the handler's second argument.
pub fn logged_in<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(Context, User, Vec<String>) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(move |ctx: Context, args: Vec<String>| -> HandlerFuture {
        let f = f.clone();
        Box::pin(async move {
            let name = Config::read_current_user(&ctx.config_path)?
                .ok_or(GatorError::NotLoggedIn)?;

            let user = UserRepository::new(ctx.db.pool())
                .get_by_name(&name)
                .await?
                .ok_or_else(|| GatorError::UserNotFound(name.clone()))?;

            f(ctx, user, args).await
        })
    })
}
