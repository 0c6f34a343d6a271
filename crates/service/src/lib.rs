//! Service layer: the post store and the facade in front of it.
//! - `storage` owns all post state and its concurrency control.
//! - `posts` validates requests and assigns identifiers.
//! - Errors are typed per layer; see `errors`.

pub mod errors;
pub mod posts;
pub mod storage;
