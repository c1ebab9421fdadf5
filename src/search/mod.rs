//! Concurrent search orchestration.
//!
//! An [`Orchestrator`] runs a fixed number of workers over a shared task
//! queue. Every fetch passes through one [`PacingGate`] so the catalog sees a
//! bounded request rate regardless of worker count. Per-task failures are
//! logged and counted; they never abort the batch.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shelf_match::config::MatchingConfig;
//! use shelf_match::matching::MatchScorer;
//! use shelf_match::models::{Query, SearchTask};
//! use shelf_match::search::{Orchestrator, SearchOptions};
//! use shelf_match::sources::BookOutletCatalog;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(BookOutletCatalog::new()?);
//! let scorer = Arc::new(MatchScorer::new(MatchingConfig::default())?);
//! let orchestrator = Orchestrator::new(catalog, scorer, SearchOptions::default())?;
//!
//! let tasks = vec![SearchTask::new(0, Query::new("The Hobbit")?)];
//! let matches = orchestrator
//!     .search_batch(tasks, |done, title| println!("{done}: {title}"))
//!     .await;
//! # let _ = matches;
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod pacing;

pub use orchestrator::{
    BatchReport, FetchPolicy, Orchestrator, SearchOptions, TaskError, TaskState,
};
pub use pacing::PacingGate;
