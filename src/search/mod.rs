//! Search orchestration module
//!
//! Normalizes a query, runs every backend concurrently, merges their
//! references and optionally attaches an impact summary.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
