use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use models::PostPatch;

/// Create input (identifier is assigned by the service)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update input; empty or missing fields mean "no change"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdatePostInput {
    /// Split into the target identifier and the store-level patch.
    pub fn into_parts(self) -> (String, PostPatch) {
        (self.id, PostPatch { title: self.title, content: self.content, tags: self.tags })
    }
}
