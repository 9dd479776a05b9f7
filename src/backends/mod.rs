//! Reference backends
//!
//! Each backend answers "where is this asset used?" for one source.
//! Failures never escape a backend; they are logged and yield no references.

pub mod afs;
pub mod sourcegraph;
mod traits;

pub use afs::AfsBackend;
pub use sourcegraph::SourcegraphBackend;
pub use traits::*;
