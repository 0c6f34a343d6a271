//! Domain types shared by the store, the service facade and the HTTP layer.

pub mod errors;
pub mod post;

pub use errors::ModelError;
pub use post::{NewPost, Post, PostPatch};
