pub mod errors;
pub mod observability;
pub mod routes;
pub mod startup;

pub use startup::{build_state, run, serve};
