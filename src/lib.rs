//! traceit: find where a file, job, or table is used
//!
//! Queries a Sourcegraph instance and a shared filesystem concurrently,
//! merges the references and optionally asks a language model to assess
//! the impact of changing the asset.

pub mod backends;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod network;
pub mod output;
pub mod query;
pub mod results;
pub mod search;
pub mod summarize;

pub use config::Settings;
pub use context::TraceContext;
pub use error::TraceError;
pub use results::{Reference, SearchOutcome, Summary};
pub use search::{Search, TraceRequest};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
