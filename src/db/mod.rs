mod memory;
pub use memory::*;
mod sqlite;
pub use sqlite::*;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Blueprint;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blueprint already exists: {author}/{name}")]
    AlreadyExists { author: String, name: String },
    #[error("blueprint not found: {author}/{name}")]
    NotFound { author: String, name: String },
    #[error("no blueprints for author: {author}")]
    AuthorNotFound { author: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage contract for blueprints, backend-agnostic.
///
/// Implementations keep `(author, name)` unique at all times and preserve
/// point insertion order. `save` must appear atomic to concurrent callers:
/// when two callers race on the same key, exactly one wins and the other
/// observes [`StoreError::AlreadyExists`].
#[async_trait]
pub trait BlueprintStore: Send + Sync {
    /// Stores a new blueprint with its points in the given order.
    async fn save(&self, blueprint: &Blueprint) -> Result<()>;

    /// Fetches one blueprint by key, points in persisted order.
    async fn get(&self, author: &str, name: &str) -> Result<Blueprint>;

    /// Fetches every blueprint owned by `author`. Zero results is
    /// [`StoreError::AuthorNotFound`], not an empty set.
    async fn get_by_author(&self, author: &str) -> Result<HashSet<Blueprint>>;

    /// Fetches every stored blueprint. An empty store yields an empty set.
    async fn get_all(&self) -> Result<HashSet<Blueprint>>;

    /// Appends one point after all existing points of `(author, name)`.
    async fn add_point(&self, author: &str, name: &str, x: i64, y: i64) -> Result<()>;
}
