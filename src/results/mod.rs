//! Reference types and the merged search outcome
//!
//! Every backend reduces its hits to [`Reference`] values tagged with their
//! [`Source`], so the orchestrator can merge them without losing provenance.

mod outcome;
mod types;

pub use outcome::SearchOutcome;
pub use types::*;
