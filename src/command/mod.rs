//! Command dispatch for gator.
//!
//! Maps CLI command names to handlers. Handlers that need an
//! authenticated user are wrapped by the login middleware before
//! registration, so the registry only ever sees the base handler type.

pub mod handlers;
pub mod middleware;
pub mod registry;

pub use handlers::build_registry;
pub use middleware::logged_in;
pub use registry::{handler, CommandHandler, CommandRegistry, HandlerFuture};

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::Database;

/// Shared state handed to every command handler.
#[derive(Clone)]
pub struct Context {
    /// Storage gateway handle.
    pub db: Arc<Database>,
    /// Location of the persisted configuration document.
    pub config_path: PathBuf,
}

impl Context {
    /// Create a new context.
    pub fn new(db: Arc<Database>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            config_path: config_path.into(),
        }
    }
}
