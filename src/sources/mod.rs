//! Book catalogs searched for reading-list titles.
//!
//! This module defines the [`Catalog`] trait the search orchestrator fetches
//! candidates through. The orchestrator never talks HTTP itself; retry and
//! request policy belong to each catalog.
//!
//! - [`BookOutletCatalog`]: scrapes the BookOutlet search page
//! - [`MockCatalog`]: canned responses, failures and delays for tests

mod bookoutlet;
pub mod mock;

pub use bookoutlet::BookOutletCatalog;
pub use mock::MockCatalog;

use crate::models::{CandidateRecord, Query};
use async_trait::async_trait;

/// A searchable book catalog
///
/// # Implementing a New Catalog
///
/// 1. Create a struct that implements `Catalog`
/// 2. Return every candidate the catalog lists for the query; ranking is the
///    scorer's job
/// 3. Map transport failures to [`CatalogError`] so they stay isolated to the
///    task that triggered them
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this catalog (e.g. "bookoutlet")
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Candidates listed for a query, possibly empty
    async fn fetch(&self, query: &Query) -> Result<Vec<CandidateRecord>, CatalogError>;
}

/// Errors that can occur when fetching from a catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// The catalog answered with something we could not read
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success response from the catalog
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err.to_string())
    }
}
