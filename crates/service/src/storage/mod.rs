//! Storage abstractions for the service layer
//!
//! `PostStore` is the contract every post backend satisfies. Two in-memory
//! variants live here:
//! - `InMemoryPostStore`: one map behind a single reader/writer lock.
//! - `ShardedPostStore`: a `DashMap`, one reader/writer lock per shard.
//!
//! # Invariants
//! - Identifiers are unique at every point in time; the existence check and
//!   the insert of `create` share one exclusive critical section.
//! - Readers only ever see fully committed records and always get clones.
//! - A failed call leaves the store untouched.
//! - Nothing is awaited while a lock guard is held.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use models::{NewPost, Post, PostPatch};

pub mod memory;
pub mod sharded;


pub use memory::InMemoryPostStore;
pub use sharded::ShardedPostStore;

/// Failures raised by a `PostStore`. Exactly one per failed call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("post with this id already exists: {0}")]
    DuplicateKey(String),
}

impl StoreError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 1003,
            StoreError::DuplicateKey(_) => 1002,
        }
    }
}

/// Keyed CRUD over posts, safe under arbitrary concurrent invocation.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post whose id is not yet taken and return the committed record.
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Snapshot of the post with the given id.
    async fn get(&self, id: &str) -> Result<Post, StoreError>;

    /// Apply a partial update atomically and return the post-update record.
    async fn update(&self, id: &str, patch: PostPatch) -> Result<Post, StoreError>;

    /// Remove the post with the given id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Number of posts currently held.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// When this store instance was constructed.
    fn created_at(&self) -> DateTime<Utc>;
}
