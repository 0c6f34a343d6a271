use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use models::{NewPost, Post, PostPatch};

use super::{PostStore, StoreError};

/// Post store over a `DashMap`: keys hash to shards, each with its own lock.
///
/// Operations on different shards run in parallel. Per key, the entry API and
/// `get_mut` keep the shard write lock across the whole check-and-mutate.
#[derive(Clone)]
pub struct ShardedPostStore {
    inner: Arc<DashMap<String, Post>>,
    created_at: DateTime<Utc>,
}

impl ShardedPostStore {
    pub fn new() -> Self {
        Self::from_map(DashMap::new())
    }

    /// `shard_amount` must be a power of two greater than one (dashmap panics otherwise).
    pub fn with_shard_amount(shard_amount: usize) -> Self {
        Self::from_map(DashMap::with_shard_amount(shard_amount))
    }

    fn from_map(map: DashMap<String, Post>) -> Self {
        Self { inner: Arc::new(map), created_at: Utc::now() }
    }
}

impl Default for ShardedPostStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl PostStore for ShardedPostStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        match self.inner.entry(post.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(post.id)),
            Entry::Vacant(slot) => {
                let stored = post.into_post(Utc::now());
                debug!(post_id = %stored.id, "post inserted");
                Ok(slot.insert(stored).value().clone())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Post, StoreError> {
        self.inner
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Post, StoreError> {
        let Some(mut existing) = self.inner.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        patch.apply(existing.value_mut(), Utc::now());
        Ok(existing.value().clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self.inner.remove(id) {
            Some(_) => {
                debug!(post_id = %id, "post removed");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn len(&self) -> usize {
        self.inner.len()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
