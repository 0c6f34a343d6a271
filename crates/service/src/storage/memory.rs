use std::{collections::hash_map::Entry, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use models::{NewPost, Post, PostPatch};

use super::{PostStore, StoreError};

/// In-memory post store: a `HashMap<id, Post>` behind one reader/writer lock.
///
/// Reads share the lock; create/update/delete hold it exclusively for the whole
/// check-and-mutate sequence. Cloning the handle shares the same map.
#[derive(Clone)]
pub struct InMemoryPostStore {
    inner: Arc<RwLock<HashMap<String, Post>>>,
    created_at: DateTime<Utc>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), created_at: Utc::now() }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut map = self.inner.write().await;
        match map.entry(post.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(post.id)),
            Entry::Vacant(slot) => {
                let stored = post.into_post(Utc::now());
                debug!(post_id = %stored.id, "post inserted");
                Ok(slot.insert(stored).clone())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Post, StoreError> {
        let map = self.inner.read().await;
        map.get(id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Post, StoreError> {
        let mut map = self.inner.write().await;
        let Some(existing) = map.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        patch.apply(existing, Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        match map.remove(id) {
            Some(_) => {
                debug!(post_id = %id, "post removed");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
