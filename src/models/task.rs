//! Unit of work fed to the search orchestrator.

use super::Query;

/// One query tagged with its position in the input batch
///
/// The index is the key used to restore input order after workers finish
/// out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    index: usize,
    query: Query,
}

impl SearchTask {
    pub fn new(index: usize, query: Query) -> Self {
        Self { index, query }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}
