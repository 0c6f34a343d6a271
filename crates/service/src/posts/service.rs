use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use common::types::StoreStats;
use models::post::{self, new_post_id};
use models::{NewPost, Post};

use super::domain::{CreatePostInput, UpdatePostInput};
use crate::errors::ServiceError;
use crate::storage::{PostStore, StoreError};

/// Post service configuration
#[derive(Clone, Debug)]
pub struct PostServiceConfig {
    /// Total create attempts, each with a freshly generated id, before a
    /// `DuplicateKey` is surfaced to the caller.
    pub create_id_attempts: u32,
}

impl Default for PostServiceConfig {
    fn default() -> Self { Self { create_id_attempts: 3 } }
}

/// Post business service independent of web framework
pub struct PostService<S: PostStore + ?Sized> {
    store: Arc<S>,
    cfg: PostServiceConfig,
}

impl<S: PostStore + ?Sized> PostService<S> {
    pub fn new(store: Arc<S>, cfg: PostServiceConfig) -> Self { Self { store, cfg } }

    /// Validate and store a new post under a generated identifier.
    ///
    /// # Examples
    /// ```
    /// use service::posts::{CreatePostInput, PostService, PostServiceConfig};
    /// use service::storage::InMemoryPostStore;
    /// use std::sync::Arc;
    /// let svc = PostService::new(Arc::new(InMemoryPostStore::new()), PostServiceConfig::default());
    /// let input = CreatePostInput { title: "Hello".into(), content: "World".into(), author: "Me".into(), ..Default::default() };
    /// let post = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert!(!post.id.is_empty());
    /// assert_eq!(post.publication_date, post.updated_at);
    /// ```
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, ServiceError> {
        post::validate_title(&input.title)?;
        post::validate_content(&input.content)?;
        post::validate_author(&input.author)?;

        match input.publication_date {
            None => warn!("publication date is not set, using current time"),
            Some(date) if date > Utc::now() => debug!(%date, "publication date lies in the future; accepted as given"),
            Some(_) => {}
        }

        let attempts = self.cfg.create_id_attempts.max(1);
        let mut attempt = 1;
        loop {
            let new_post = NewPost {
                id: new_post_id(),
                title: input.title.clone(),
                content: input.content.clone(),
                author: input.author.clone(),
                publication_date: input.publication_date,
                tags: input.tags.clone(),
            };
            match self.store.create(new_post).await {
                Ok(post) => {
                    info!(post_id = %post.id, "post_created");
                    return Ok(post);
                }
                Err(StoreError::DuplicateKey(id)) if attempt < attempts => {
                    warn!(post_id = %id, attempt, "generated id already taken, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    error!(err = %e, attempt, "create post failed");
                    return Err(e.into());
                }
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Post, ServiceError> {
        post::validate_id(id)?;
        let found = self.store.get(id).await?;
        debug!(post_id = %id, "post_retrieved");
        Ok(found)
    }

    /// Apply a partial update; at least one of title/content/tags must carry a value.
    #[instrument(skip(self, input), fields(post_id = %input.id))]
    pub async fn update(&self, input: UpdatePostInput) -> Result<Post, ServiceError> {
        let (id, patch) = input.into_parts();
        post::validate_id(&id)?;
        if patch.is_empty() {
            return Err(ServiceError::Validation(
                "at least one field (title, content, tags) must be provided for update".into(),
            ));
        }
        let updated = self.store.update(&id, patch).await?;
        info!(post_id = %id, "post_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        post::validate_id(id)?;
        self.store.delete(id).await?;
        info!(post_id = %id, "post_deleted");
        Ok(())
    }

    /// Store bookkeeping: record count, construction time and uptime.
    pub async fn stats(&self) -> StoreStats {
        let store_created_at = self.store.created_at();
        StoreStats {
            posts: self.store.len().await,
            store_created_at,
            uptime_secs: (Utc::now() - store_created_at).num_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryPostStore, ShardedPostStore};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use models::PostPatch;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store that reports `DuplicateKey` for the first `collisions` creates.
    struct CollidingStore {
        inner: InMemoryPostStore,
        collisions: u32,
        calls: AtomicU32,
    }

    impl CollidingStore {
        fn new(collisions: u32) -> Self {
            Self { inner: InMemoryPostStore::new(), collisions, calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl PostStore for CollidingStore {
        async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.collisions {
                return Err(StoreError::DuplicateKey(post.id));
            }
            self.inner.create(post).await
        }
        async fn get(&self, id: &str) -> Result<Post, StoreError> { self.inner.get(id).await }
        async fn update(&self, id: &str, patch: PostPatch) -> Result<Post, StoreError> { self.inner.update(id, patch).await }
        async fn delete(&self, id: &str) -> Result<(), StoreError> { self.inner.delete(id).await }
        async fn len(&self) -> usize { self.inner.len().await }
        fn created_at(&self) -> DateTime<Utc> { self.inner.created_at() }
    }

    fn svc() -> PostService<InMemoryPostStore> {
        PostService::new(Arc::new(InMemoryPostStore::new()), PostServiceConfig::default())
    }

    fn input() -> CreatePostInput {
        CreatePostInput {
            title: "My First Blog Post".into(),
            content: "This is the content of my first blog post.".into(),
            author: "Aman Pandae".into(),
            publication_date: None,
            tags: vec!["trending".into(), "topic".into(), "cloud".into()],
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() -> Result<(), anyhow::Error> {
        let svc = svc();
        let a = svc.create(input()).await?;
        let b = svc.create(input()).await?;
        assert_ne!(a.id, b.id);
        assert_eq!(a.author, "Aman Pandae");
        assert_eq!(a.tags, vec!["trending", "topic", "cloud"]);
        assert_eq!(svc.get(&a.id).await?, a);
        Ok(())
    }

    #[tokio::test]
    async fn create_keeps_caller_publication_date() -> Result<(), anyhow::Error> {
        let date = Utc.with_ymd_and_hms(2020, 2, 29, 8, 0, 0).unwrap();
        let post = svc().create(CreatePostInput { publication_date: Some(date), ..input() }).await?;
        assert_eq!(post.publication_date, date);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let svc = svc();
        for bad in [
            CreatePostInput { title: "".into(), ..input() },
            CreatePostInput { content: " ".into(), ..input() },
            CreatePostInput { author: "".into(), ..input() },
        ] {
            let err = svc.create(bad).await.unwrap_err();
            assert!(err.is_invalid_input(), "unexpected error: {err}");
            assert_eq!(err.code(), 1001);
        }
        assert!(svc.store.is_empty().await);
    }

    #[tokio::test]
    async fn create_retries_with_fresh_id_on_duplicate() -> Result<(), anyhow::Error> {
        let store = Arc::new(CollidingStore::new(2));
        let svc = PostService::new(Arc::clone(&store), PostServiceConfig { create_id_attempts: 3 });
        let post = svc.create(input()).await?;
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert_eq!(svc.get(&post.id).await?.title, "My First Blog Post");
        Ok(())
    }

    #[tokio::test]
    async fn create_surfaces_duplicate_after_attempts_exhausted() {
        let store = Arc::new(CollidingStore::new(5));
        let svc = PostService::new(Arc::clone(&store), PostServiceConfig { create_id_attempts: 2 });
        let err = svc.create(input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::DuplicateKey(_))));
        assert_eq!(err.code(), 1002);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_requires_id_and_some_field() -> Result<(), anyhow::Error> {
        let svc = svc();
        let post = svc.create(input()).await?;

        let err = svc.update(UpdatePostInput { id: "".into(), title: Some("x".into()), ..Default::default() }).await.unwrap_err();
        assert!(err.is_invalid_input());

        let err = svc
            .update(UpdatePostInput { id: post.id.clone(), title: Some("".into()), tags: Some(vec![]), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // rejected update left the record alone, timestamp included
        assert_eq!(svc.get(&post.id).await?, post);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_only_whitespace_is_rejected() -> Result<(), anyhow::Error> {
        let svc = svc();
        let post = svc.create(input()).await?;

        let err = svc
            .update(UpdatePostInput { id: post.id.clone(), title: Some("   ".into()), content: Some("\t".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // a blank field next to a real one is skipped, never stored
        let updated = svc
            .update(UpdatePostInput { id: post.id.clone(), title: Some("  ".into()), content: Some("New body".into()), ..Default::default() })
            .await?;
        assert_eq!(updated.title, post.title);
        assert_eq!(updated.content, "New body");
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() -> Result<(), anyhow::Error> {
        let svc = PostService::new(Arc::new(ShardedPostStore::new()), PostServiceConfig::default());
        let created = svc.create(input()).await?;

        let updated = svc
            .update(UpdatePostInput {
                id: created.id.clone(),
                title: Some("Updated Title".into()),
                content: None,
                tags: Some(vec!["news".into()]),
            })
            .await?;
        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.tags, vec!["news"]);
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.author, created.author);
        assert_eq!(updated.publication_date, created.publication_date);
        assert!(updated.updated_at > created.updated_at);

        svc.delete(&created.id).await?;
        let err = svc.get(&created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
        assert_eq!(err.code(), 1003);
        let err = svc.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn get_and_delete_reject_blank_id() {
        let svc = svc();
        assert!(svc.get("").await.unwrap_err().is_invalid_input());
        assert!(svc.delete("  ").await.unwrap_err().is_invalid_input());
    }

    #[tokio::test]
    async fn stats_track_store_size() -> Result<(), anyhow::Error> {
        let svc = svc();
        assert_eq!(svc.stats().await.posts, 0);
        let post = svc.create(input()).await?;
        svc.create(input()).await?;
        let stats = svc.stats().await;
        assert_eq!(stats.posts, 2);
        assert_eq!(stats.store_created_at, svc.store.created_at());
        assert!(stats.uptime_secs >= 0);
        svc.delete(&post.id).await?;
        assert_eq!(svc.stats().await.posts, 1);
        Ok(())
    }

    #[tokio::test]
    async fn works_over_trait_object_store() -> Result<(), anyhow::Error> {
        let store: Arc<dyn PostStore> = Arc::new(InMemoryPostStore::new());
        let svc: PostService<dyn PostStore> = PostService::new(store, PostServiceConfig::default());
        let post = svc.create(input()).await?;
        assert_eq!(svc.get(&post.id).await?.id, post.id);
        Ok(())
    }
}
