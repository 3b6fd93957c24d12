//! Command registry for gator.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use super::Context;
use crate::{GatorError, Result};

/// Boxed future returned by command handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// A registered command handler.
///
/// Handlers receive the shared context and the command's positional
/// arguments. Authenticated handlers are wrapped into this same shape
/// by the login middleware, so the registry cannot tell them apart.
pub type CommandHandler = Box<dyn Fn(Context, Vec<String>) -> HandlerFuture + Send + Sync>;

/// Adapt a plain async function into a boxed command handler.
pub fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(move |ctx, args| -> HandlerFuture { Box::pin(f(ctx, args)) })
}

/// Registry mapping command names to handlers.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under the given command name.
    pub fn register(&mut self, name: impl Into<String>, handler: CommandHandler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Check whether a command name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a command by name.
    pub async fn run(&self, name: &str, ctx: Context, args: Vec<String>) -> Result<()> {
        match self.handlers.get(name) {
            Some(handler) => handler(ctx, args).await,
            None => Err(GatorError::UnknownCommand(name.to_string())),
        }
    }
}
