//! Shared building blocks for the blog store binaries and crates.

pub mod types;
pub mod utils;
