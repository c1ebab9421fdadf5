//! Matching engine: ISBN handling, title normalization, similarity and scoring.
//!
//! - [`isbn`]: normalize, validate and convert ISBN-10/ISBN-13 identifiers
//! - [`title`]: canonical title forms and the variations compared by the scorer
//! - [`fuzz`]: the four 0..=100 similarity measures
//! - [`MatchScorer`]: selects the best candidate for a query
//!
//! # Example
//!
//! ```rust
//! use shelf_match::config::MatchingConfig;
//! use shelf_match::matching::MatchScorer;
//! use shelf_match::models::{CandidateBuilder, Query};
//!
//! let scorer = MatchScorer::new(MatchingConfig::default()).unwrap();
//! let query = Query::new("The Hobbit").unwrap();
//! let candidates = vec![CandidateBuilder::new("The Hobbit (Illustrated Edition)").build()];
//!
//! let outcome = scorer.score(&query, &candidates);
//! assert!(outcome.found);
//! ```

pub mod fuzz;
pub mod isbn;
mod scorer;
pub mod title;

pub use isbn::{Isbn, IsbnKind};
pub use scorer::{author_similarity, MatchScorer};
