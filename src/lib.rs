//! # Shelf Match
//!
//! Matches the books on a Goodreads shelf against the BookOutlet catalog.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Query, CandidateRecord, MatchResult, etc.)
//! - [`matching`]: ISBN normalization, title normalization and match scoring
//! - [`search`]: Concurrent batch search with request pacing
//! - [`sources`]: Catalogs searched for candidates, behind the [`Catalog`] trait
//! - [`input`]: Goodreads library export parsing
//! - [`output`]: Report rendering (text, JSON, CSV, Markdown, HTML)
//! - [`config`]: Layered configuration
//! - [`ui`]: Terminal progress and summaries
//! - [`utils`]: HTTP client and retry helpers

pub mod config;
pub mod input;
pub mod matching;
pub mod models;
pub mod output;
pub mod search;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use matching::MatchScorer;
pub use models::{MatchResult, Query, SearchTask};
pub use search::Orchestrator;
pub use sources::Catalog;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
