//! Mock catalog for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{CandidateRecord, Query};
use crate::sources::{Catalog, CatalogError};

#[derive(Debug, Clone)]
enum MockResponse {
    Candidates(Vec<CandidateRecord>),
    Failure(CatalogError),
    Panic(String),
}

/// A mock catalog that returns predefined responses keyed by query title.
///
/// Titles without a configured response yield no candidates. Each response
/// can be delayed to shape completion order in concurrency tests.
#[derive(Debug, Default)]
pub struct MockCatalog {
    responses: HashMap<String, MockResponse>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCatalog {
    /// Create a new mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these candidates for `title`.
    pub fn with_candidates(mut self, title: &str, candidates: Vec<CandidateRecord>) -> Self {
        self.responses
            .insert(title.to_string(), MockResponse::Candidates(candidates));
        self
    }

    /// Fail every fetch for `title`.
    pub fn with_failure(mut self, title: &str, error: CatalogError) -> Self {
        self.responses
            .insert(title.to_string(), MockResponse::Failure(error));
        self
    }

    /// Panic inside the fetch for `title`.
    pub fn with_panic(mut self, title: &str, message: &str) -> Self {
        self.responses
            .insert(title.to_string(), MockResponse::Panic(message.to_string()));
        self
    }

    /// Sleep before answering for `title`.
    pub fn with_delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    /// Number of fetch calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the fetch is cancelled
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Catalog"
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<CandidateRecord>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(query.title()) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(query.title()) {
            Some(MockResponse::Candidates(candidates)) => Ok(candidates.clone()),
            Some(MockResponse::Failure(error)) => Err(error.clone()),
            Some(MockResponse::Panic(message)) => panic!("{message}"),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateBuilder;

    #[tokio::test]
    async fn test_mock_catalog_responses() {
        let catalog = MockCatalog::new()
            .with_candidates("Dune", vec![CandidateBuilder::new("Dune").build()])
            .with_failure("Emma", CatalogError::Network("offline".to_string()));

        let dune = catalog.fetch(&Query::new("Dune").unwrap()).await.unwrap();
        assert_eq!(dune.len(), 1);

        let emma = catalog.fetch(&Query::new("Emma").unwrap()).await;
        assert!(matches!(emma, Err(CatalogError::Network(_))));

        let unknown = catalog.fetch(&Query::new("Beloved").unwrap()).await.unwrap();
        assert!(unknown.is_empty());

        assert_eq!(catalog.calls(), 3);
        assert_eq!(catalog.max_in_flight(), 1);
    }

    #[test]
    #[should_panic(expected = "scraper exploded")]
    fn test_mock_catalog_panic() {
        let catalog = MockCatalog::new().with_panic("Dune", "scraper exploded");
        let _ = tokio_test::block_on(catalog.fetch(&Query::new("Dune").unwrap()));
    }
}
