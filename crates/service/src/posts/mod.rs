//! Posts module: the facade between transport handlers and a `PostStore`.
//!
//! Validates request shape, assigns identifiers and forwards to the store.

pub mod domain;
pub mod service;

pub use domain::{CreatePostInput, UpdatePostInput};
pub use service::{PostService, PostServiceConfig};
