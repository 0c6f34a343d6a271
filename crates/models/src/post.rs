use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// A stored blog post.
///
/// `id`, `author` and `publication_date` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub publication_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Input to `PostStore::create`: a post whose identifier is already assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    /// Materialize the stored record. A missing publication date defaults to `now`;
    /// a supplied one is kept verbatim.
    pub fn into_post(self, now: DateTime<Utc>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            author: self.author,
            publication_date: self.publication_date.unwrap_or(now),
            updated_at: now,
            tags: self.tags,
        }
    }
}

/// Partial update. `None`, blank strings and empty tag lists mean "no change".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    /// True when applying the patch would leave every mutable field untouched.
    pub fn is_empty(&self) -> bool {
        self.title.as_deref().map_or(true, is_blank)
            && self.content.as_deref().map_or(true, is_blank)
            && self.tags.as_ref().map_or(true, Vec::is_empty)
    }

    /// Apply to `post` in place and refresh `updated_at`, even when nothing else changed.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = self.title.filter(|t| !is_blank(t)) {
            post.title = title;
        }
        if let Some(content) = self.content.filter(|c| !is_blank(c)) {
            post.content = content;
        }
        if let Some(tags) = self.tags.filter(|t| !t.is_empty()) {
            post.tags = tags;
        }
        post.updated_at = next_modified(post.updated_at, now);
    }
}

/// Last-modified value strictly after `previous`, normally `now`.
///
/// Falls back to `previous + 1µs` when the wall clock has not advanced (or went backwards).
pub fn next_modified(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Fresh opaque identifier for a post.
pub fn new_post_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require_non_blank(value: &str, message: &str) -> Result<(), ModelError> {
    if is_blank(value) {
        return Err(ModelError::Validation(message.into()));
    }
    Ok(())
}

pub fn validate_id(id: &str) -> Result<(), ModelError> {
    require_non_blank(id, "post id cannot be empty")
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    require_non_blank(title, "post title cannot be empty")
}

pub fn validate_content(content: &str) -> Result<(), ModelError> {
    require_non_blank(content, "post content cannot be empty")
}

pub fn validate_author(author: &str) -> Result<(), ModelError> {
    require_non_blank(author, "post author cannot be empty")
}
